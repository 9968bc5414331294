pub mod claim;
pub mod levels;
pub mod models;
pub mod pagination;
pub mod processors;
pub mod refresh;
pub mod router;
pub mod withdraw;
