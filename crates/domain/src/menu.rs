//! Menus, their options, and the payloads that create and edit them.

use chrono::{DateTime, Utc};
use common::{MenuId, Money, OptionId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::{ValidationReport, validate_menu, validate_menu_update};

/// A menu entry with its selectable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: MenuId,
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub options: Vec<MenuOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An add-on that can be selected for a menu (e.g. "extra shot").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOption {
    pub id: OptionId,
    #[serde(skip_serializing, default = "MenuOption::unassigned_menu")]
    pub menu_id: MenuId,
    pub name: String,
    pub additional_price: Money,
}

impl MenuOption {
    fn unassigned_menu() -> MenuId {
        MenuId::new(0)
    }
}

// -- Payloads --

/// Body of a menu creation request. Every field is optional so that missing
/// values surface as validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuPayload {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub options: Option<Vec<MenuOptionPayload>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOptionPayload {
    pub name: Option<String>,
    pub additional_price: Option<i64>,
}

/// Body of a partial menu update.
///
/// `description` and `imageUrl` distinguish "absent" (`None`) from an explicit
/// `null` (`Some(None)`), which clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuUpdatePayload {
    pub name: Option<String>,
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub image_url: Option<Option<String>>,
}

impl MenuUpdatePayload {
    /// Returns true if the payload changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }
}

fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// -- Validated inputs --

/// A validated menu ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenu {
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub options: Vec<NewMenuOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenuOption {
    pub name: String,
    pub additional_price: Money,
}

impl TryFrom<MenuPayload> for NewMenu {
    type Error = ValidationReport;

    fn try_from(payload: MenuPayload) -> Result<Self, Self::Error> {
        validate_menu(&payload).into_result()?;

        // Blank option names pass validation only when they are whitespace;
        // those entries are dropped rather than stored.
        let options = payload
            .options
            .unwrap_or_default()
            .into_iter()
            .filter_map(|opt| {
                let name = opt.name?.trim().to_string();
                (!name.is_empty()).then(|| NewMenuOption {
                    name,
                    additional_price: Money::new(opt.additional_price.unwrap_or(0)),
                })
            })
            .collect();

        Ok(NewMenu {
            name: payload.name.unwrap_or_default().trim().to_string(),
            price: Money::new(payload.price.unwrap_or(0)),
            description: payload.description.filter(|d| !d.is_empty()),
            image_url: normalize_image_url(payload.image_url.as_deref()),
            options,
        })
    }
}

/// A validated set of menu field changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuChanges {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub description: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

impl TryFrom<MenuUpdatePayload> for MenuChanges {
    type Error = ValidationReport;

    fn try_from(payload: MenuUpdatePayload) -> Result<Self, Self::Error> {
        validate_menu_update(&payload).into_result()?;

        Ok(MenuChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            price: payload.price.map(Money::new),
            description: payload.description,
            image_url: payload
                .image_url
                .map(|url| normalize_image_url(url.as_deref())),
        })
    }
}

/// Normalizes an image reference.
///
/// Blank values mean "no image". Absolute URLs and paths already under
/// `/images/` are kept; a bare file name is placed under `/images/`.
pub fn normalize_image_url(image_url: Option<&str>) -> Option<String> {
    let trimmed = image_url?.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("/images/")
    {
        Some(trimmed.to_string())
    } else {
        Some(format!("/images/{trimmed}"))
    }
}
