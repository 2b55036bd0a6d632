use crate::{RegisterReq, RegisterRes, ReportReq, ReportRes, STATE_SERVICE, STATISTICS_SERVICE};

use http::uri::PathAndQuery;
use tonic::GrpcMethod;
use tonic::client::Grpc;
use tonic::transport::Channel;
use tonic::{IntoRequest, Request, Response, Status};
use tonic_prost::ProstCodec;

/// Issue one unary call on `grpc`, tagging the request with its method name
async fn unary<Req, Res>(
    grpc: &mut Grpc<Channel>,
    request: Request<Req>,
    service: &'static str,
    method: &'static str,
    path: &'static str,
) -> Result<Response<Res>, Status>
where
    Req: prost::Message + Send + Sync + 'static,
    Res: prost::Message + Default + Send + Sync + 'static,
{
    grpc.ready()
        .await
        .map_err(|e| Status::unknown(format!("Service was not ready: {e}")))?;

    let codec: ProstCodec<Req, Res> = ProstCodec::default();
    let mut request = request;
    request
        .extensions_mut()
        .insert(GrpcMethod::new(service, method));

    grpc.unary(request, PathAndQuery::from_static(path), codec)
        .await
}

/// Client for the statistics collector
#[derive(Debug, Clone)]
pub struct StatisticsClient {
    inner: Grpc<Channel>,
}

impl StatisticsClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    pub async fn register_for_stats(
        &mut self,
        request: impl IntoRequest<RegisterReq>,
    ) -> Result<Response<RegisterRes>, Status> {
        unary(
            &mut self.inner,
            request.into_request(),
            STATISTICS_SERVICE,
            "RegisterForStats",
            "/sb_stats_proto.Statistics/RegisterForStats",
        )
        .await
    }
}

/// Client for the state collector
#[derive(Debug, Clone)]
pub struct StateClient {
    inner: Grpc<Channel>,
}

impl StateClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    pub async fn register_for_state(
        &mut self,
        request: impl IntoRequest<RegisterReq>,
    ) -> Result<Response<RegisterRes>, Status> {
        unary(
            &mut self.inner,
            request.into_request(),
            STATE_SERVICE,
            "RegisterForState",
            "/sb_state_proto.State/RegisterForState",
        )
        .await
    }

    pub async fn report_state(
        &mut self,
        request: impl IntoRequest<ReportReq>,
    ) -> Result<Response<ReportRes>, Status> {
        unary(
            &mut self.inner,
            request.into_request(),
            STATE_SERVICE,
            "ReportState",
            "/sb_state_proto.State/ReportState",
        )
        .await
    }
}
