pub mod categorymodel;
pub mod jobmodel;
pub mod notificationmodel;
pub mod paymentmodel;
pub mod ratingmodel;
pub mod usermodel;
