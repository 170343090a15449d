//! Selection State
//!
//! What the cart currently selects, derived once per evaluation and shared by every rule.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::{
    items::{LineItem, sum_line_totals},
    tags::{collection::TagCollection, string::StringTagCollection},
};

/// Option identifiers listed in a rule config.
pub type OptionIds = SmallVec<[String; 4]>;

/// Condition that activates a conditional rule.
///
/// Option triggers are OR'd (any listed option suffices), tag triggers are AND'd
/// (every listed tag must be present). An empty half is vacuously satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trigger {
    /// Any of these options being selected satisfies the option half.
    pub option_ids: OptionIds,

    /// All of these tags must be present among the selected tags.
    pub tags: StringTagCollection,
}

impl Trigger {
    /// Whether neither half lists anything.
    pub fn is_empty(&self) -> bool {
        self.option_ids.is_empty() && self.tags.is_empty()
    }
}

/// Selections a `require` rule demands once triggered: all options and all tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    /// Every one of these options must be selected.
    pub option_ids: OptionIds,

    /// Every one of these tags must be present among the selected tags.
    pub tags: StringTagCollection,
}

impl Requirement {
    /// Whether neither list has entries.
    pub fn is_empty(&self) -> bool {
        self.option_ids.is_empty() && self.tags.is_empty()
    }
}

/// Subset of cart items a discount is calculated against.
///
/// An item matches when it is listed by id or carries any listed tag. An empty filter
/// matches every selected item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliesTo {
    /// Options matched by identity.
    pub option_ids: OptionIds,

    /// Options matched by carrying any of these tags.
    pub tags: StringTagCollection,
}

impl AppliesTo {
    /// Whether the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.option_ids.is_empty() && self.tags.is_empty()
    }

    /// Whether the filter matches the given item, ignoring its quantity.
    pub fn matches(&self, item: &LineItem) -> bool {
        self.is_empty()
            || self.option_ids.iter().any(|id| id == item.option_id())
            || item.tags().intersects(&self.tags)
    }
}

/// Selected option ids and the union of their tags.
///
/// Items with `qty <= 0` contribute to neither.
#[derive(Debug, Clone)]
pub struct SelectionState<'a> {
    items: &'a [LineItem],
    option_ids: FxHashSet<&'a str>,
    tags: StringTagCollection,
}

impl<'a> SelectionState<'a> {
    /// Derive the selection state from a cart.
    pub fn from_items(items: &'a [LineItem]) -> Self {
        let mut option_ids = FxHashSet::default();
        let mut tags = StringTagCollection::empty();

        for item in items.iter().filter(|item| item.is_selected()) {
            option_ids.insert(item.option_id());
            tags |= item.tags().clone();
        }

        Self {
            items,
            option_ids,
            tags,
        }
    }

    /// Items with a quantity above zero, in cart order.
    pub fn selected_items(&self) -> impl Iterator<Item = &'a LineItem> + use<'a> {
        self.items.iter().filter(|item| item.is_selected())
    }

    /// Whether the option is selected.
    pub fn is_selected(&self, option_id: &str) -> bool {
        self.option_ids.contains(option_id)
    }

    /// Number of distinct selected options.
    pub fn selected_count(&self) -> usize {
        self.option_ids.len()
    }

    /// Union of the tags of every selected item.
    pub fn tags(&self) -> &StringTagCollection {
        &self.tags
    }

    /// Evaluate a trigger against the selection.
    pub fn is_triggered(&self, trigger: &Trigger) -> bool {
        let option_satisfied = trigger.option_ids.is_empty()
            || trigger.option_ids.iter().any(|id| self.is_selected(id));
        let tag_satisfied = self.tags.contains_all(&trigger.tags);

        option_satisfied && tag_satisfied
    }

    /// Whether every required option is selected and every required tag present.
    pub fn satisfies(&self, requirement: &Requirement) -> bool {
        requirement.option_ids.iter().all(|id| self.is_selected(id))
            && self.tags.contains_all(&requirement.tags)
    }

    /// Sum of `unit_price * qty` over selected items matching the filter.
    pub fn eligible_subtotal(&self, applies_to: &AppliesTo) -> Decimal {
        sum_line_totals(self.selected_items().filter(|item| applies_to.matches(item)))
    }
}
