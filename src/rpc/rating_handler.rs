use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};
use tonic::{Request, Response, Status};

use crate::data::model::rating::RatingRecord;
use crate::data::repo::rating_repo::RatingRepo;
use crate::rpc::proto::rating_service_server::RatingService;
use crate::rpc::proto::{
    ChangeStatus, RenameRequest, TopRatings, TopRequest, UserRating, UserRequest,
};
use crate::utils::error_utils::RpcError;

/// Maps each RPC onto exactly one `RatingRepo` call.
pub struct RatingHandler {
    repo: RatingRepo,
    workers: Arc<Semaphore>,
}

impl RatingHandler {
    pub fn new(repo: RatingRepo, max_workers: usize) -> Self {
        Self {
            repo,
            workers: Arc::new(Semaphore::new(max_workers)),
        }
    }

    async fn worker(&self) -> Result<SemaphorePermit<'_>, RpcError> {
        Ok(self.workers.acquire().await?)
    }
}

impl From<RatingRecord> for UserRating {
    fn from(record: RatingRecord) -> Self {
        UserRating {
            user_id: record.user_id,
            nickname: record.nickname,
            total_correct: record.total_correct,
            total_wrong: record.total_wrong,
        }
    }
}

impl From<bool> for ChangeStatus {
    fn from(changed: bool) -> Self {
        ChangeStatus {
            id: if changed { 1 } else { 0 },
        }
    }
}

#[tonic::async_trait]
impl RatingService for RatingHandler {
    async fn get_user_rating(
        &self,
        request: Request<UserRequest>,
    ) -> Result<Response<UserRating>, Status> {
        let user_id = request.into_inner().id;
        log::debug!("GetUserRating for {}", user_id);
        let _worker = self.worker().await?;
        let rating = self
            .repo
            .fetch_by_user_id(user_id)
            .await
            .map_err(RpcError::from)?;
        Ok(Response::new(rating.map(UserRating::from).unwrap_or_default()))
    }

    async fn get_top_ratings(
        &self,
        _request: Request<TopRequest>,
    ) -> Result<Response<TopRatings>, Status> {
        let _worker = self.worker().await?;
        let top = self.repo.fetch_top().await.map_err(RpcError::from)?;
        log::debug!(
            "GetTopRatings returns {} entries, best score {:?}",
            top.len(),
            top.first().map(RatingRecord::score)
        );
        Ok(Response::new(TopRatings {
            top_users: top.into_iter().map(UserRating::from).collect(),
        }))
    }

    async fn initialize_user_rating(
        &self,
        request: Request<UserRequest>,
    ) -> Result<Response<ChangeStatus>, Status> {
        let user_id = request.into_inner().id;
        log::debug!("InitializeUserRating for {}", user_id);
        let _worker = self.worker().await?;
        let created = self
            .repo
            .initialize(user_id)
            .await
            .map_err(RpcError::from)?;
        Ok(Response::new(created.into()))
    }

    async fn increment_correct(
        &self,
        request: Request<UserRequest>,
    ) -> Result<Response<ChangeStatus>, Status> {
        let user_id = request.into_inner().id;
        log::debug!("IncrementCorrect for {}", user_id);
        let _worker = self.worker().await?;
        let changed = self
            .repo
            .increment_correct(user_id)
            .await
            .map_err(RpcError::from)?;
        Ok(Response::new(changed.into()))
    }

    async fn increment_wrong(
        &self,
        request: Request<UserRequest>,
    ) -> Result<Response<ChangeStatus>, Status> {
        let user_id = request.into_inner().id;
        log::debug!("IncrementWrong for {}", user_id);
        let _worker = self.worker().await?;
        let changed = self
            .repo
            .increment_wrong(user_id)
            .await
            .map_err(RpcError::from)?;
        Ok(Response::new(changed.into()))
    }

    async fn rename_user(
        &self,
        request: Request<RenameRequest>,
    ) -> Result<Response<ChangeStatus>, Status> {
        let RenameRequest { id, nick } = request.into_inner();
        log::debug!("RenameUser for {} to {:?}", id, nick);
        let _worker = self.worker().await?;
        let changed = self.repo.rename(id, &nick).await.map_err(RpcError::from)?;
        Ok(Response::new(changed.into()))
    }

    async fn delete_user(
        &self,
        request: Request<UserRequest>,
    ) -> Result<Response<ChangeStatus>, Status> {
        let user_id = request.into_inner().id;
        log::debug!("DeleteUser {}", user_id);
        let _worker = self.worker().await?;
        let changed = self.repo.remove(user_id).await.map_err(RpcError::from)?;
        Ok(Response::new(changed.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tokio::sync::oneshot;

    use crate::data::db::tests::temp_pool;
    use crate::data::model::rating::DEFAULT_NICKNAME;
    use crate::rpc::proto::rating_service_client::RatingServiceClient;
    use crate::rpc::{serve, MAX_WORKERS};

    async fn handler() -> (TempDir, RatingHandler) {
        let (dir, pool) = temp_pool().await;
        (dir, RatingHandler::new(RatingRepo::new(pool), MAX_WORKERS))
    }

    fn user(id: i64) -> Request<UserRequest> {
        Request::new(UserRequest { id })
    }

    async fn status(
        call: impl std::future::Future<Output = Result<Response<ChangeStatus>, Status>>,
    ) -> i32 {
        call.await.unwrap().into_inner().id
    }

    #[tokio::test]
    async fn missing_user_yields_empty_rating() {
        let (_dir, handler) = handler().await;
        let rating = handler.get_user_rating(user(1)).await.unwrap().into_inner();
        assert_eq!(rating, UserRating::default());
    }

    #[tokio::test]
    async fn initialize_reports_created_then_existing() {
        let (_dir, handler) = handler().await;
        assert_eq!(status(handler.initialize_user_rating(user(1))).await, 1);
        assert_eq!(status(handler.initialize_user_rating(user(1))).await, 0);

        let rating = handler.get_user_rating(user(1)).await.unwrap().into_inner();
        assert_eq!(
            rating,
            UserRating {
                user_id: 1,
                nickname: DEFAULT_NICKNAME.to_string(),
                total_correct: 0,
                total_wrong: 0,
            }
        );
    }

    #[tokio::test]
    async fn mutations_on_missing_user_report_zero() {
        let (_dir, handler) = handler().await;
        assert_eq!(status(handler.increment_correct(user(2))).await, 0);
        assert_eq!(status(handler.increment_wrong(user(2))).await, 0);
        assert_eq!(
            status(handler.rename_user(Request::new(RenameRequest {
                id: 2,
                nick: "nobody".to_string(),
            })))
            .await,
            0
        );
        assert_eq!(status(handler.delete_user(user(2))).await, 0);

        let top = handler
            .get_top_ratings(Request::new(TopRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert!(top.top_users.is_empty());
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let (_dir, handler) = handler().await;
        status(handler.initialize_user_rating(user(3))).await;
        assert_eq!(status(handler.increment_correct(user(3))).await, 1);
        assert_eq!(status(handler.increment_correct(user(3))).await, 1);
        assert_eq!(status(handler.increment_wrong(user(3))).await, 1);
        assert_eq!(
            status(handler.rename_user(Request::new(RenameRequest {
                id: 3,
                nick: "trivia fan".to_string(),
            })))
            .await,
            1
        );

        let rating = handler.get_user_rating(user(3)).await.unwrap().into_inner();
        assert_eq!(
            rating,
            UserRating {
                user_id: 3,
                nickname: "trivia fan".to_string(),
                total_correct: 2,
                total_wrong: 1,
            }
        );

        assert_eq!(status(handler.delete_user(user(3))).await, 1);
        let rating = handler.get_user_rating(user(3)).await.unwrap().into_inner();
        assert_eq!(rating, UserRating::default());
    }

    #[tokio::test]
    async fn serves_rating_service_over_grpc() {
        let (_dir, handler) = handler().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, handler, async move {
            let _ = shutdown_rx.await;
        }));

        let mut client = RatingServiceClient::connect(format!("http://{}", addr))
            .await
            .unwrap();
        for id in 1..=3 {
            let created = client
                .initialize_user_rating(UserRequest { id })
                .await
                .unwrap()
                .into_inner();
            assert_eq!(created.id, 1);
            for _ in 0..id {
                client.increment_wrong(UserRequest { id }).await.unwrap();
            }
        }

        let top = client
            .get_top_ratings(TopRequest {})
            .await
            .unwrap()
            .into_inner();
        let order: Vec<i64> = top.top_users.iter().map(|u| u.user_id).collect();
        assert_eq!(order, vec![3, 2, 1]);

        drop(client);
        let _ = shutdown_tx.send(());
        server.await.unwrap().unwrap();
    }
}
