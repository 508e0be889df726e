pub mod biddb;
pub mod categorydb;
#[allow(clippy::module_inception)]
pub mod db;
pub mod jobdb;
pub mod notificationdb;
pub mod paymentdb;
pub mod ratingdb;
pub mod userdb;
