mod cropper_modal;
mod gift_details;
mod memories_form;
mod memory_tile;
mod status_banner;
mod submitted;

pub use cropper_modal::{CropSettings, CropperModal};
pub use gift_details::GiftDetailsCard;
pub use memories_form::MemoriesForm;
pub use memory_tile::MemoryTileCard;
pub use status_banner::StatusBanner;
pub use submitted::SubmittedScreen;
