pub mod company;
pub mod company_user;
pub mod pickup_request;
pub mod quote;
pub mod quote_item;
pub mod rep_account;
pub mod service;
pub mod skid;
pub mod user;
pub mod waybill;
pub mod waybill_service;
