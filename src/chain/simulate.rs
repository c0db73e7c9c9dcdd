//! Dry-run gas simulation over the tx service.

use http::uri::Uri;
use ibc_proto::cosmos::tx::v1beta1::service_client::ServiceClient;
use ibc_proto::cosmos::tx::v1beta1::{SimulateRequest, SimulateResponse, Tx};
use prost::Message;

use crate::error::Error;

/// Submit a candidate transaction to the simulate endpoint and return the
/// raw response. The message set is simulated as one atomic unit.
pub async fn send_tx_simulate(grpc_address: &Uri, tx: Tx) -> Result<SimulateResponse, Error> {
    let mut tx_bytes = vec![];
    tx.encode(&mut tx_bytes)
        .map_err(|e| Error::protobuf_encode(String::from("Transaction"), e))?;

    let req = SimulateRequest {
        tx_bytes,
        ..Default::default()
    };

    let mut client = ServiceClient::connect(grpc_address.clone())
        .await
        .map_err(Error::grpc_transport)?;

    let request = tonic::Request::new(req);
    let response = client
        .simulate(request)
        .await
        .map_err(|e| Error::grpc_status("simulate".to_string(), e))?
        .into_inner();

    Ok(response)
}
