pub mod trending_api;
