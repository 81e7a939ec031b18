//! Promotional banners. Display only; prices are never affected.

use std::sync::Arc;

use aerobook_core::promotion::{Promotion, PromotionDraft, DEFAULT_BG_COLOR};
use aerobook_core::repository::PromotionRepository;
use aerobook_core::{parse_id, CoreError, CoreResult};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 200;

pub struct PromotionRegistry {
    repo: Arc<dyn PromotionRepository>,
}

fn invalid(msg: &str) -> CoreError {
    CoreError::InvalidArgument(msg.to_string())
}

fn not_found() -> CoreError {
    CoreError::NotFound("Offer not found".to_string())
}

/// Trimmed, non-empty value or the given error message.
fn required(value: Option<String>, msg: &str) -> CoreResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid(msg))
}

fn check_lengths(promotion: &Promotion) -> CoreResult<()> {
    if promotion.title.chars().count() > TITLE_MAX {
        return Err(invalid("Title cannot be more than 100 characters"));
    }
    if promotion.description.chars().count() > DESCRIPTION_MAX {
        return Err(invalid("Description cannot be more than 200 characters"));
    }
    Ok(())
}

impl PromotionRegistry {
    pub fn new(repo: Arc<dyn PromotionRepository>) -> Self {
        Self { repo }
    }

    /// Active promotions, newest first.
    pub async fn list_active(&self) -> CoreResult<Vec<Promotion>> {
        Ok(self.repo.list_promotions(true).await?)
    }

    pub async fn list_all(&self) -> CoreResult<Vec<Promotion>> {
        Ok(self.repo.list_promotions(false).await?)
    }

    pub async fn get(&self, id: &str) -> CoreResult<Promotion> {
        let id = parse_id(id, "Offer")?;
        self.repo.get_promotion(id).await?.ok_or_else(not_found)
    }

    pub async fn create(&self, draft: PromotionDraft) -> CoreResult<Promotion> {
        let promotion = Promotion {
            id: Uuid::new_v4(),
            title: required(draft.title, "Please provide an offer title")?,
            description: required(draft.description, "Please provide an offer description")?,
            discount: required(draft.discount, "Please provide a discount value")?,
            valid_until: draft
                .valid_until
                .ok_or_else(|| invalid("Please provide an expiry date"))?,
            bg_color: draft
                .bg_color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BG_COLOR.to_string()),
            is_active: draft.is_active.unwrap_or(true),
            created_at: Utc::now(),
        };
        check_lengths(&promotion)?;

        self.repo.create_promotion(&promotion).await?;
        info!(offer_id = %promotion.id, title = %promotion.title, "Offer created");
        Ok(promotion)
    }

    /// Partial update: absent fields keep their value, present ones are validated like on create.
    pub async fn update(&self, id: &str, draft: PromotionDraft) -> CoreResult<Promotion> {
        let mut promotion = self.get(id).await?;

        if draft.title.is_some() {
            promotion.title = required(draft.title, "Please provide an offer title")?;
        }
        if draft.description.is_some() {
            promotion.description = required(draft.description, "Please provide an offer description")?;
        }
        if draft.discount.is_some() {
            promotion.discount = required(draft.discount, "Please provide a discount value")?;
        }
        if let Some(valid_until) = draft.valid_until {
            promotion.valid_until = valid_until;
        }
        if let Some(bg_color) = draft.bg_color {
            promotion.bg_color = bg_color;
        }
        if let Some(is_active) = draft.is_active {
            promotion.is_active = is_active;
        }
        check_lengths(&promotion)?;

        self.repo.update_promotion(&promotion).await?;
        Ok(promotion)
    }

    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        let id = parse_id(id, "Offer")?;
        if !self.repo.delete_promotion(id).await? {
            return Err(not_found());
        }
        info!(offer_id = %id, "Offer deleted");
        Ok(())
    }
}
