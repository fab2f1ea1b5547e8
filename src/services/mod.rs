// Directory
pub mod packages;
pub mod users;

// Delivery requests and their lifecycle
pub mod request_status;
pub mod requests;

// Partner console
pub mod partners;
pub mod reviews;
