//! Trip-mode hooks run after a tool call is interpreted
//!
//! A hook sees the finished result and the pre-call document and may append
//! actions of its own. Hooks are registered per [`TripMode`].

use tracing::{debug, info};

use super::ToolResult;
use crate::trip::{ActivityCategory, BurgerAchievement, MetadataPatch, Rarity, TripAction, TripDocument};

/// Extra behavior for one trip mode
pub trait ModeHook: Send + Sync {
    /// Actions to append after `tool` produced `result` against `doc`
    fn after_tool(&self, tool: &str, result: &ToolResult, doc: &TripDocument) -> Vec<TripAction>;
}

/// Burger challenge scoring
///
/// Every burger venue with a description is collected as an achievement.
/// Rarity comes from the description: "legendary" beats "rare" beats common.
pub struct BurgerChallengeHook;

impl BurgerChallengeHook {
    pub fn rarity(description: &str) -> Rarity {
        let lower = description.to_lowercase();
        if lower.contains("legendary") {
            Rarity::Legendary
        } else if lower.contains("rare") {
            Rarity::Rare
        } else {
            Rarity::Common
        }
    }
}

impl ModeHook for BurgerChallengeHook {
    fn after_tool(&self, tool: &str, result: &ToolResult, doc: &TripDocument) -> Vec<TripAction> {
        if tool != "add_burger_recommendations" || result.is_error {
            return Vec::new();
        }

        let mut score = doc.metadata.burger_score.unwrap_or(0);
        let mut collected = doc.metadata.burgers_collected.clone();

        for venue in result.venues.iter().filter(|v| v.category == ActivityCategory::Burger) {
            let Some(description) = &venue.description else {
                continue;
            };
            let rarity = Self::rarity(description);
            score += rarity.points();
            debug!(restaurant = %venue.restaurant_name, ?rarity, "BurgerChallengeHook: collected");
            collected.push(BurgerAchievement {
                city: venue.stop_name.clone(),
                restaurant_name: venue.restaurant_name.clone(),
                specialty: venue.specialty.clone(),
                rarity,
                collected: true,
            });
        }

        info!(score, collected = collected.len(), "BurgerChallengeHook: score updated");
        vec![TripAction::UpdateTripMetadata(MetadataPatch {
            burger_score: Some(score),
            burgers_collected: Some(collected),
            ..Default::default()
        })]
    }
}
