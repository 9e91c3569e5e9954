pub mod feed_service;
pub mod match_service;
pub mod quota;
pub mod swipe_service;
