use flex_error::{define_error, DisplayOnly, TraceError};

define_error! {
    Error {
        InvalidMnemonic
            [ TraceError<anyhow::Error> ]
            |_| { "invalid mnemonic" },

        Bip32KeyGeneration
            [ TraceError<bitcoin::bip32::Error> ]
            |_| { "cannot generate private key from derivation path" },

        InvalidKeyBytes
            [ DisplayOnly<k256::ecdsa::Error> ]
            |_| { "invalid raw private key bytes" },

        Bech32Account
            [ TraceError<bech32::Error> ]
            |_| { "cannot generate bech32 account address" },

        Signing
            [ DisplayOnly<k256::ecdsa::Error> ]
            |_| { "signing operation failed" },

        KeystoreDecode
            [ TraceError<serde_json::Error> ]
            |_| { "cannot decode keystore payload" },

        KeystoreDecrypt
            |_| { "cannot decrypt keystore: wrong passphrase or corrupted data" },

        KeystoreKdf
            { reason: String }
            |e| { format_args!("key derivation failed: {}", e.reason) },

        KeystoreField
            { field: String }
            |e| { format_args!("keystore field {} is malformed", e.field) },
    }
}
