pub mod rating_repo;
