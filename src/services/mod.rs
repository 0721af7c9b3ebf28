pub mod aws;
pub mod backend;
pub mod identity_service;
pub mod queue_service;
pub mod storage_service;
pub mod topic_service;
pub mod tree_builder;
