use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Tier Classifier
///
/// Maps a cumulative contribution total to a named recognition tier. Two
/// independent instantiations exist (donation tiers for individual donors,
/// sponsorship tiers for organizations) sharing the same algorithm over
/// different band tables. Classification is a pure lookup with no state: band
/// tables are produced fresh by their constructor functions and never mutated.

// --- Tier Enumerations ---

/// DonationTier
///
/// Recognition levels for individual donors on the donor wall, ordered lowest
/// to highest. The derived `Ord` follows declaration order, which is what the
/// monotonicity of `classify` is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DonationTier {
    Turtle,
    Wolf,
    Bear,
    Eagle,
}

impl DonationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationTier::Turtle => "turtle",
            DonationTier::Wolf => "wolf",
            DonationTier::Bear => "bear",
            DonationTier::Eagle => "eagle",
        }
    }
}

/// SponsorTier
///
/// Recognition levels for sponsoring organizations, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SponsorTier {
    Bronze,
    Silver,
    Gold,
}

impl SponsorTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SponsorTier::Bronze => "bronze",
            SponsorTier::Silver => "silver",
            SponsorTier::Gold => "gold",
        }
    }
}

// --- Band Tables ---

/// TierBand
///
/// One row of a band table: the tier awarded once a cumulative amount reaches
/// `minimum` (inclusive). Tables are ordered highest threshold first so the
/// classifier can return the first satisfied band.
#[derive(Debug, Clone, Copy)]
pub struct TierBand<T> {
    pub tier: T,
    pub minimum: Decimal,
}

/// donation_bands
///
/// Donor wall thresholds. Contiguous, non-overlapping, strictly increasing
/// minimums; amounts below the turtle minimum carry no tier.
pub fn donation_bands() -> [TierBand<DonationTier>; 4] {
    [
        TierBand { tier: DonationTier::Eagle, minimum: Decimal::from(10_000) },
        TierBand { tier: DonationTier::Bear, minimum: Decimal::from(5_000) },
        TierBand { tier: DonationTier::Wolf, minimum: Decimal::from(1_000) },
        TierBand { tier: DonationTier::Turtle, minimum: Decimal::from(100) },
    ]
}

/// sponsorship_bands
///
/// Sponsor wall thresholds. Independent of the donation table: the two walls
/// must never share band state.
pub fn sponsorship_bands() -> [TierBand<SponsorTier>; 3] {
    [
        TierBand { tier: SponsorTier::Gold, minimum: Decimal::from(50_000) },
        TierBand { tier: SponsorTier::Silver, minimum: Decimal::from(25_000) },
        TierBand { tier: SponsorTier::Bronze, minimum: Decimal::from(10_000) },
    ]
}

// --- The Classifier ---

/// classify
///
/// Returns the highest tier whose minimum threshold is satisfied by `amount`,
/// or `None` when the amount sits below every band. Bands are scanned highest
/// first, so an amount exactly on a boundary lands in the higher tier
/// (inclusive lower bound). Negative amounts are out-of-domain and classify
/// to `None`.
pub fn classify<T: Copy>(amount: Decimal, bands: &[TierBand<T>]) -> Option<T> {
    bands
        .iter()
        .find(|band| amount >= band.minimum)
        .map(|band| band.tier)
}

/// donation_tier
///
/// Convenience wrapper binding `classify` to the donor wall table.
pub fn donation_tier(amount: Decimal) -> Option<DonationTier> {
    classify(amount, &donation_bands())
}

/// sponsorship_tier
///
/// Convenience wrapper binding `classify` to the sponsor wall table.
pub fn sponsorship_tier(amount: Decimal) -> Option<SponsorTier> {
    classify(amount, &sponsorship_bands())
}
