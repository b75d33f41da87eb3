// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models mirrored from the loyalty API.

pub mod card;
pub mod palette;
pub mod pass;
pub mod program;
pub mod user;

pub use card::{reconcile_expired, CardStatus, PunchCard};
pub use palette::BrandPalette;
pub use pass::ScanPayload;
pub use program::{normalize_merchant_programs, MerchantGroup, MerchantInfo, NormalizedPrograms, Program};
pub use user::{User, UserRole};
