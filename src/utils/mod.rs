pub mod catalog;
pub mod enrollment;
pub mod favorites;
pub mod filter;
pub mod identity;
pub mod observer;
pub mod render;
pub mod session;
pub mod storage;
#[cfg(test)]
pub mod test_server;
