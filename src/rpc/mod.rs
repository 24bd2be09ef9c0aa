use std::future::Future;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use crate::rpc::proto::rating_service_server::RatingServiceServer;
use crate::rpc::rating_handler::RatingHandler;

pub mod rating_handler;

pub mod proto {
    tonic::include_proto!("rating");
}

/// Upper bound on RPC calls touching storage at the same time.
pub const MAX_WORKERS: usize = 10;

/// Serves the rating service on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    handler: RatingHandler,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    Server::builder()
        .add_service(RatingServiceServer::new(handler))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}
