use async_trait::async_trait;
use http::uri::PathAndQuery;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tonic::Status;

use crate::client::WorkflowClient;
use crate::error::WorkflowError;
use crate::types::{ExecuteWorkflowRequest, TlsMaterial, WorkflowHandle};

/// `tonic` codec that (de)serializes requests/responses as JSON rather than
/// protobuf — a stand-in for the real workflow-engine wire format, which is
/// out of scope here (§2 Non-goals: "a production Temporal/gRPC wire
/// implementation").
#[derive(Default, Clone, Copy)]
struct JsonCodec;

impl Codec for JsonCodec {
    type Encode = ExecuteWorkflowRequest;
    type Decode = WorkflowHandle;
    type Encoder = JsonCodec;
    type Decoder = JsonCodec;

    fn encoder(&mut self) -> Self::Encoder {
        *self
    }

    fn decoder(&mut self) -> Self::Decoder {
        *self
    }
}

impl Encoder for JsonCodec {
    type Item = ExecuteWorkflowRequest;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, buf: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        use bytes::BufMut;
        let bytes = serde_json::to_vec(&item).map_err(|e| Status::internal(e.to_string()))?;
        buf.put_slice(&bytes);
        Ok(())
    }
}

impl Decoder for JsonCodec {
    type Item = WorkflowHandle;
    type Error = Status;

    fn decode(&mut self, buf: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        use bytes::Buf;
        if !buf.has_remaining() {
            return Ok(None);
        }
        let item = serde_json::from_slice(buf.chunk()).map_err(|e| Status::internal(e.to_string()))?;
        buf.advance(buf.remaining());
        Ok(Some(item))
    }
}

/// `tonic`-based workflow client shape — wires up a TLS channel to the
/// Site's workflow engine endpoint and issues a unary RPC per
/// `execute_workflow` call, the way a codegen'd service client would
/// (§C4, §4.4).
pub struct TonicWorkflowClient {
    channel: Channel,
    path: PathAndQuery,
}

impl TonicWorkflowClient {
    pub async fn connect(endpoint: Endpoint, tls: &TlsMaterial) -> Result<Self, WorkflowError> {
        let ca_cert = std::fs::read(&tls.ca_path)
            .map_err(|e| WorkflowError::Transient(format!("reading Site CA cert {}: {e}", tls.ca_path)))?;
        let client_cert = std::fs::read(&tls.cert_path)
            .map_err(|e| WorkflowError::Transient(format!("reading Site client cert {}: {e}", tls.cert_path)))?;
        let client_key = std::fs::read(&tls.key_path)
            .map_err(|e| WorkflowError::Transient(format!("reading Site client key {}: {e}", tls.key_path)))?;

        let tls_config = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(ca_cert))
            .identity(Identity::from_pem(client_cert, client_key))
            .domain_name(tls.server_name.clone());

        let endpoint = endpoint
            .tls_config(tls_config)
            .map_err(|e| WorkflowError::Transient(format!("configuring Site TLS material: {e}")))?;

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| WorkflowError::Transient(format!("connecting to workflow engine: {e}")))?;
        let path = PathAndQuery::from_static("/cloudcore.workflow.v1.WorkflowService/StartWorkflowExecution");
        Ok(Self { channel, path })
    }
}

#[async_trait]
impl WorkflowClient for TonicWorkflowClient {
    async fn execute_workflow(&self, request: ExecuteWorkflowRequest) -> Result<WorkflowHandle, WorkflowError> {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready().await.map_err(|e| WorkflowError::Transient(e.to_string()))?;
        let response = grpc
            .unary(tonic::Request::new(request), self.path.clone(), JsonCodec)
            .await
            .map_err(|status| WorkflowError::SiteAgentFailure(status.message().to_string()))?;
        Ok(response.into_inner())
    }
}
