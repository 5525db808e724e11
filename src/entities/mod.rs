//! Concrete catalog records and their association rows

pub mod account;
pub mod client;
pub mod discount;
pub mod links;
pub mod macros;
pub mod marketplace;
pub mod shop;

pub use account::{Account, ApiToken, Registration};
pub use client::{Client, ClientProfile};
pub use discount::{Discount, DiscountDraft};
pub use links::{FavoriteDiscount, ShopToClient, ShopToMarketplace};
pub use marketplace::{Marketplace, MarketplaceDraft};
pub use shop::{Shop, ShopDraft};
