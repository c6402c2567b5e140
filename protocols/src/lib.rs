pub mod arp;
pub mod banner;
pub mod tcp;
