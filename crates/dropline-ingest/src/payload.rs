// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polymorphic inbound delivery-event payloads.
//!
//! The route-planning provider pushes several wire shapes. They are
//! recognized as an explicit tagged union; anything else lands in the
//! `Unrecognized` bucket and is only logged. There is deliberately no
//! speculative field-scraping across shapes: a payload either matches a
//! known envelope or it does not.

use serde::Deserialize;
use serde_json::Value;

/// One delivery stop as the provider sends it.
///
/// Field aliases cover the provider's naming drift across payload shapes;
/// every field is optional on the wire and validated at ingestion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStop {
    #[serde(default, alias = "stop_id", alias = "external_id")]
    pub id: Option<String>,
    #[serde(default, alias = "customer_name", alias = "customer")]
    pub name: Option<String>,
    #[serde(default, alias = "phone_number", alias = "customer_phone")]
    pub phone: Option<String>,
    #[serde(default, alias = "delivery_address", alias = "street_address")]
    pub address: Option<String>,
    #[serde(default, alias = "scheduled_date", alias = "delivery_date")]
    pub date: Option<String>,
    #[serde(default, alias = "scheduled_time", alias = "arrival_time")]
    pub time: Option<String>,
    #[serde(default, alias = "store", alias = "location_code")]
    pub classification: Option<String>,
    #[serde(default, alias = "items", alias = "product_description")]
    pub product: Option<String>,
    #[serde(default, alias = "driver_name")]
    pub driver: Option<String>,
    #[serde(default, alias = "plan_id")]
    pub route_id: Option<String>,
}

/// The recognized envelope shapes.
#[derive(Debug)]
pub enum DeliveryPayload {
    /// Bare array of stops.
    Batch(Vec<RawStop>),
    /// `{"stop": {...}}`
    StopEnvelope(RawStop),
    /// `{"route": {"id": ..., "stops": [...]}}`
    RouteEnvelope {
        route_id: Option<String>,
        stops: Vec<RawStop>,
    },
    /// `{"type": ..., "data": <any recognized shape>}`
    EventEnvelope {
        event_type: String,
        inner: Box<DeliveryPayload>,
    },
    /// A bare stop-like object.
    Single(RawStop),
    /// Anything else; only ever logged.
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    stops: Vec<RawStop>,
}

/// Keys whose presence marks an object as stop-like. Recognition is by
/// shape only; values are never inspected.
const STOP_MARKER_KEYS: &[&str] = &[
    "id",
    "stop_id",
    "external_id",
    "phone",
    "phone_number",
    "customer_phone",
    "address",
    "delivery_address",
    "customer_name",
];

impl DeliveryPayload {
    /// Classify a JSON payload into one of the recognized shapes.
    pub fn classify(value: Value) -> Self {
        if value.is_array() {
            return match serde_json::from_value::<Vec<RawStop>>(value.clone()) {
                Ok(stops) => Self::Batch(stops),
                Err(_) => Self::Unrecognized(value),
            };
        }

        let Some(object) = value.as_object() else {
            return Self::Unrecognized(value);
        };

        if object.contains_key("stop") {
            return match serde_json::from_value::<RawStop>(object["stop"].clone()) {
                Ok(stop) => Self::StopEnvelope(stop),
                Err(_) => Self::Unrecognized(value),
            };
        }

        if object.contains_key("route") {
            return match serde_json::from_value::<RouteBody>(object["route"].clone()) {
                Ok(route) => Self::RouteEnvelope {
                    route_id: route.id,
                    stops: route.stops,
                },
                Err(_) => Self::Unrecognized(value),
            };
        }

        if let (Some(event_type), Some(data)) = (
            object.get("type").and_then(|t| t.as_str()),
            object.get("data"),
        ) {
            return Self::EventEnvelope {
                event_type: event_type.to_string(),
                inner: Box::new(Self::classify(data.clone())),
            };
        }

        if STOP_MARKER_KEYS.iter().any(|k| object.contains_key(*k)) {
            return match serde_json::from_value::<RawStop>(value.clone()) {
                Ok(stop) => Self::Single(stop),
                Err(_) => Self::Unrecognized(value),
            };
        }

        Self::Unrecognized(value)
    }
}

/// Flattened outcome of classification.
#[derive(Debug, Default)]
pub struct NormalizedStops {
    pub stops: Vec<RawStop>,
    /// Route/plan identifiers seen on envelopes, for reconciliation.
    pub route_ids: Vec<String>,
    /// Payload fragments that matched no recognized shape.
    pub unrecognized: Vec<Value>,
}

/// Normalize any inbound payload into a flat stop list.
pub fn normalize(value: Value) -> NormalizedStops {
    let mut out = NormalizedStops::default();
    flatten(DeliveryPayload::classify(value), &mut out);
    out
}

fn flatten(payload: DeliveryPayload, out: &mut NormalizedStops) {
    match payload {
        DeliveryPayload::Batch(stops) => out.stops.extend(stops),
        DeliveryPayload::StopEnvelope(stop) | DeliveryPayload::Single(stop) => {
            out.stops.push(stop)
        }
        DeliveryPayload::RouteEnvelope { route_id, stops } => {
            if let Some(id) = route_id {
                out.route_ids.push(id);
            }
            out.stops.extend(stops);
        }
        DeliveryPayload::EventEnvelope { inner, .. } => flatten(*inner, out),
        DeliveryPayload::Unrecognized(value) => out.unrecognized.push(value),
    }
}
