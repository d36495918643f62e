//! Diffing of a submitted layout against the stored one.
//!
//! Spaces are matched by `(floor, x, y)`. A matched pair yields either an
//! [`UpdatePayload`] or nothing; an unmatched submission becomes a create.
//! Stored spaces missing from the submission are reported but never touched.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Serialize, Serializer};

use crate::config::ReconcileConfig;
use crate::error::{Error, RecordError, Result, ValidationCode, ValidationError, Violation};
use crate::ir::{LayoutSpec, SeatType, SpaceConfigInput, SpaceKey, SpaceType};
use crate::layout::placement;
use crate::layout::{MetaRecord, Seat, Space, SpaceKind, SpaceRecord};

/// Change to one nullable column of a stored space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => serializer.serialize_some(value),
            Self::Keep | Self::Clear => serializer.serialize_none(),
        }
    }
}

/// Minimal set of column changes for one stored space.
///
/// `Keep` fields are left out of the serialized form; `Clear` fields are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub space_type: SpaceType,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub seat_number: FieldUpdate<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub seat_type: FieldUpdate<SeatType>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub reclinement_angle: FieldUpdate<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceUpdate {
    pub key: SpaceKey,
    pub payload: UpdatePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub create: Vec<Space>,
    pub update: Vec<SpaceUpdate>,
    pub unchanged: Vec<SpaceKey>,
    /// Stored spaces absent from the submission. What that means is up to the caller.
    pub omitted: Vec<SpaceKey>,
}

impl Reconciliation {
    /// True when applying this plan would not write anything.
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.update.is_empty()
    }
}

/// Whether `incoming` differs from `existing` in anything it actually states.
///
/// Seat fields left out of the submission are not compared.
pub fn needs_update(incoming: &SpaceConfigInput, existing: &Space) -> bool {
    if incoming.effective_type() != existing.space_type() {
        return true;
    }
    if let Some(active) = incoming.active {
        if active != existing.active {
            return true;
        }
    }
    let Some(seat) = existing.seat() else {
        return false;
    };
    seat_differs(incoming, seat)
}

fn seat_differs(incoming: &SpaceConfigInput, seat: &Seat) -> bool {
    incoming.trimmed_seat_number() != Some(seat.seat_number.as_str())
        || incoming
            .seat_type
            .is_some_and(|seat_type| seat_type != seat.seat_type)
        || incoming
            .amenities
            .as_ref()
            .is_some_and(|amenities| *amenities != seat.amenities)
        || incoming
            .reclinement_angle
            .is_some_and(|angle| angle != seat.reclinement_angle)
}

/// Builds the payload turning `existing` into `incoming`.
pub fn build_update(
    incoming: &SpaceConfigInput,
    existing: &Space,
    spec: &LayoutSpec,
    config: &ReconcileConfig,
) -> Result<UpdatePayload> {
    update_payload(0, incoming, existing, spec, config)
}

fn update_payload(
    index: usize,
    incoming: &SpaceConfigInput,
    existing: &Space,
    spec: &LayoutSpec,
    config: &ReconcileConfig,
) -> Result<UpdatePayload> {
    let key = existing.key();
    let old_type = existing.space_type();
    let new_type = incoming.effective_type();

    let mut payload = UpdatePayload {
        space_type: new_type,
        seat_number: FieldUpdate::Keep,
        seat_type: FieldUpdate::Keep,
        reclinement_angle: FieldUpdate::Keep,
        amenities: None,
        meta: None,
        active: incoming.active,
    };

    if new_type != old_type {
        if new_type.is_seat() {
            let floor = spec
                .floor(key.floor_number)
                .ok_or_else(|| floor_not_found(index, key))?;
            let seat_meta = placement::seat_meta(existing.position, floor);
            payload.meta = Some(MetaRecord::seat(existing.meta, seat_meta));
        } else if old_type.is_seat() {
            payload.meta = Some(MetaRecord::structural(existing.meta));
        }
    }

    if new_type.is_seat() {
        let seat_number = incoming
            .trimmed_seat_number()
            .ok_or_else(|| seat_number_required(index, key))?;
        payload.seat_number = FieldUpdate::Set(seat_number.to_string());

        // A space becoming a seat has no stored seat columns to keep.
        let entering = !old_type.is_seat();
        payload.seat_type = match incoming.seat_type {
            Some(seat_type) => FieldUpdate::Set(seat_type),
            None if entering => FieldUpdate::Set(config.default_seat_type),
            None => FieldUpdate::Keep,
        };
        payload.reclinement_angle = match incoming.reclinement_angle {
            Some(angle) => FieldUpdate::Set(angle),
            None if entering => FieldUpdate::Set(config.default_reclinement_angle),
            None => FieldUpdate::Keep,
        };
        payload.amenities = match &incoming.amenities {
            Some(amenities) => Some(amenities.clone()),
            None if entering => Some(BTreeSet::new()),
            None => None,
        };
    } else {
        payload.seat_number = FieldUpdate::Clear;
        payload.seat_type = FieldUpdate::Clear;
        payload.reclinement_angle = FieldUpdate::Clear;
        payload.amenities = Some(BTreeSet::new());
    }

    Ok(payload)
}

/// Builds a fresh space for a submission with no stored counterpart.
pub fn build_create(
    incoming: &SpaceConfigInput,
    spec: &LayoutSpec,
    config: &ReconcileConfig,
) -> Result<Space> {
    create_space(0, incoming, spec, config)
}

fn create_space(
    index: usize,
    incoming: &SpaceConfigInput,
    spec: &LayoutSpec,
    config: &ReconcileConfig,
) -> Result<Space> {
    let key = incoming.key().ok_or_else(|| missing_fields(index))?;
    let position = key.position();
    let kind = match SpaceKind::structural(incoming.effective_type()) {
        Some(kind) => kind,
        None => {
            let floor = spec
                .floor(key.floor_number)
                .ok_or_else(|| floor_not_found(index, key))?;
            let seat_number = incoming
                .trimmed_seat_number()
                .ok_or_else(|| seat_number_required(index, key))?;
            SpaceKind::Seat(Seat {
                seat_number: seat_number.to_string(),
                seat_type: incoming.seat_type.unwrap_or(config.default_seat_type),
                amenities: incoming.amenities.clone().unwrap_or_default(),
                reclinement_angle: incoming
                    .reclinement_angle
                    .unwrap_or(config.default_reclinement_angle),
                meta: placement::seat_meta(position, floor),
            })
        }
    };
    let mut space = Space::new(key.floor_number, position, kind);
    space.active = incoming.active.unwrap_or(true);
    Ok(space)
}

/// Compares a full submission against the stored layout.
pub fn reconcile(
    incoming: &[SpaceConfigInput],
    existing: &[Space],
    spec: &LayoutSpec,
    config: &ReconcileConfig,
) -> Result<Reconciliation> {
    let stored: BTreeMap<SpaceKey, &Space> =
        existing.iter().map(|space| (space.key(), space)).collect();
    let mut seen: HashSet<SpaceKey> = HashSet::with_capacity(incoming.len());
    let mut plan = Reconciliation::default();

    for (index, item) in incoming.iter().enumerate() {
        let key = item.key().ok_or_else(|| missing_fields(index))?;
        if !seen.insert(key) {
            return Err(ValidationError::single(Violation::new(
                ValidationCode::DuplicatePositions,
                index,
                format!("position {key} is used more than once"),
            ))
            .into());
        }
        match stored.get(&key) {
            Some(current) if needs_update(item, current) => {
                let payload = update_payload(index, item, current, spec, config)?;
                plan.update.push(SpaceUpdate { key, payload });
            }
            Some(_) => plan.unchanged.push(key),
            None => plan.create.push(create_space(index, item, spec, config)?),
        }
    }

    plan.omitted = stored
        .keys()
        .filter(|key| !seen.contains(*key))
        .copied()
        .collect();

    tracing::debug!(
        create = plan.create.len(),
        update = plan.update.len(),
        unchanged = plan.unchanged.len(),
        omitted = plan.omitted.len(),
        "reconciled layout"
    );
    Ok(plan)
}

/// Applies a plan to the stored layout. Omitted spaces are kept. Output is ordered by key.
pub fn apply(existing: &[Space], plan: &Reconciliation) -> Result<Vec<Space>> {
    let mut spaces: BTreeMap<SpaceKey, Space> = existing
        .iter()
        .map(|space| (space.key(), space.clone()))
        .collect();
    for update in &plan.update {
        let current = spaces
            .get(&update.key)
            .ok_or(RecordError::UnknownSpace {
                key: update.key.to_string(),
            })?;
        let updated = current.apply_update(&update.payload)?;
        spaces.insert(update.key, updated);
    }
    for created in &plan.create {
        spaces.insert(created.key(), created.clone());
    }
    Ok(spaces.into_values().collect())
}

impl Space {
    /// Returns this space with `payload` applied.
    pub fn apply_update(&self, payload: &UpdatePayload) -> std::result::Result<Space, RecordError> {
        let mut record = SpaceRecord::from(self);
        record.space_type = payload.space_type;
        record.seat_number = payload.seat_number.clone().apply(record.seat_number);
        record.seat_type = payload.seat_type.clone().apply(record.seat_type);
        record.reclinement_angle = payload
            .reclinement_angle
            .clone()
            .apply(record.reclinement_angle);
        if let Some(amenities) = &payload.amenities {
            record.amenities = amenities.clone();
        }
        if let Some(meta) = &payload.meta {
            record.meta = meta.clone();
        }
        if let Some(active) = payload.active {
            record.active = active;
        }
        Space::try_from(record)
    }
}

fn missing_fields(index: usize) -> Error {
    ValidationError::single(Violation::new(
        ValidationCode::MissingRequiredFields,
        index,
        "floorNumber and position are required",
    ))
    .into()
}

fn seat_number_required(index: usize, key: SpaceKey) -> Error {
    ValidationError::single(Violation::new(
        ValidationCode::SeatNumberRequired,
        index,
        format!("seat at {key} has no seat number"),
    ))
    .into()
}

fn floor_not_found(index: usize, key: SpaceKey) -> Error {
    ValidationError::single(Violation::new(
        ValidationCode::FloorConfigNotFound,
        index,
        format!(
            "floor configuration not found for floor {}",
            key.floor_number
        ),
    ))
    .into()
}
