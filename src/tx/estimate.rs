//! Production gas estimation: dry-run over the tx service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use ibc_proto::google::protobuf::Any;

use crate::account::AccountSequence;
use crate::chain::simulate::send_tx_simulate;
use crate::chain::Connection;
use crate::config::Memo;
use crate::error::Error;
use crate::keyring::pubkey::PublicKey;
use crate::provider::GasEstimator;
use crate::tx::encode::build_simulate_tx;
use crate::tx::types::GasEstimate;

/// [`GasEstimator`] backed by the chain's simulate endpoint.
///
/// A failed or empty simulation is a hard error. There is no fallback to a
/// default gas value; a transaction the chain cannot simulate must not be
/// offered for signing with a guessed limit.
pub struct GrpcGasEstimator {
    connection: Arc<Connection>,
}

impl GrpcGasEstimator {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl GasEstimator for GrpcGasEstimator {
    async fn estimate_gas(
        &self,
        messages: &[Any],
        public_key: Option<&PublicKey>,
        sequence: AccountSequence,
        memo: &Memo,
    ) -> Result<GasEstimate, Error> {
        self.connection.ensure_live()?;

        let tx = build_simulate_tx(messages, public_key, sequence, memo)?;

        let response = send_tx_simulate(self.connection.grpc_address(), tx).await?;

        let gas_info = response
            .gas_info
            .ok_or_else(|| Error::simulation("simulate response carried no gas info".to_string()))?;

        debug!(
            gas_used = gas_info.gas_used,
            messages = messages.len(),
            "simulated transaction"
        );

        Ok(GasEstimate {
            gas_used: gas_info.gas_used,
        })
    }
}
