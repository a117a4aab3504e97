//! Loading the order and its sections.
//!
//! Every section follows the same two phases: publish whatever the local cache
//! holds, then refresh from the remote store when connected. The phases of one
//! section run in sequence; sections run in parallel with each other.

use super::{Effects, OrderDetailReducer};
use crate::actions::{OrderDetailAction, Refresh};
use crate::environment::OrderDetailEnvironment;
use crate::error::{OrderDetailError, RepositoryError, Section};
use crate::events::Notice;
use crate::snapshot::ViewStatePatch;
use crate::state::OrderDetailState;
use crate::types::{
    Order, OrderIdSet, OrderNote, OrderShipmentTracking, Refund, RequestResult, ShippingLabel,
};
use order_detail_core::effect::Effect;
use order_detail_core::{async_effect, smallvec, SmallVec};
use std::sync::Arc;

impl OrderDetailReducer {
    pub(super) fn start(state: &mut OrderDetailState, env: &OrderDetailEnvironment) -> Effects {
        if state.started {
            tracing::debug!("Order detail already started");
            return SmallVec::new();
        }
        state.started = true;
        tracing::info!(order = %state.identifier, "Opening order detail");

        let repository = Arc::clone(&env.repository);
        let identifier = state.identifier.clone();
        smallvec![async_effect! {
            let order = repository.get_order(identifier).await;
            Some(OrderDetailAction::LocalOrderLoaded { order })
        }]
    }

    pub(super) fn refresh_requested(
        state: &mut OrderDetailState,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        state
            .snapshot
            .apply_patch(&ViewStatePatch::new().refreshing(true));
        Self::fetch_order(state, env, false)
    }

    pub(super) fn local_order_loaded(
        state: &mut OrderDetailState,
        order: Option<Order>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        match order {
            Some(order) => {
                tracing::debug!(order = %state.identifier, "Order found in local cache");
                Self::apply_order(state, order, env);
                Self::load_sections(state, env)
            },
            None => Self::fetch_order(state, env, true),
        }
    }

    pub(super) fn order_fetched(
        state: &mut OrderDetailState,
        result: Result<Order, RepositoryError>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        let settled = ViewStatePatch::new().detail_skeleton(false).refreshing(false);

        match result {
            Ok(order) => {
                Self::apply_order(state, order, env);
                state.snapshot.apply_patch(&settled);
                Self::load_sections(state, env)
            },
            Err(error) => {
                state.snapshot.apply_patch(&settled);
                Self::fetch_failed(env, Section::Order, &error)
            },
        }
    }

    /// Remote order fetch, shared by the first load and pull-to-refresh
    fn fetch_order(
        state: &mut OrderDetailState,
        env: &OrderDetailEnvironment,
        show_skeleton: bool,
    ) -> Effects {
        if !env.is_connected() {
            tracing::info!(order = %state.identifier, "Cannot fetch order while offline");
            state.snapshot.apply_patch(
                &ViewStatePatch::new().detail_skeleton(false).refreshing(false),
            );
            return smallvec![Self::notify(
                env,
                Notice::Failure(OrderDetailError::Offline)
            )];
        }

        state
            .snapshot
            .apply_patch(&ViewStatePatch::new().detail_skeleton(show_skeleton));

        let repository = Arc::clone(&env.repository);
        let identifier = state.identifier.clone();
        smallvec![async_effect! {
            let result = repository.fetch_order(identifier).await;
            Some(OrderDetailAction::OrderFetched { result })
        }]
    }

    fn apply_order(state: &mut OrderDetailState, order: Order, env: &OrderDetailEnvironment) {
        let status = env.repository.get_order_status(&order.status);
        state.set_order(order, status);
    }

    fn fetch_failed(
        env: &OrderDetailEnvironment,
        section: Section,
        error: &RepositoryError,
    ) -> Effects {
        tracing::warn!(section = section.as_str(), %error, "Fetch failed");
        metrics::counter!("order_detail.fetch_failures", "section" => section.as_str())
            .increment(1);
        smallvec![Self::notify(
            env,
            Notice::Failure(OrderDetailError::Fetch(section))
        )]
    }

    /// Start every section loader for the loaded order
    fn load_sections(state: &mut OrderDetailState, env: &OrderDetailEnvironment) -> Effects {
        let Some(ids) = state.ids() else {
            return SmallVec::new();
        };

        state
            .snapshot
            .apply_patch(&ViewStatePatch::new().notes_skeleton(true));

        let mut loaders = vec![
            Self::notes_loader(ids, env),
            Self::refunds_loader(ids, env),
            Self::trackings_loader(ids, env),
        ];
        if let Some(labels) = Self::labels_loader(state, ids, env) {
            loaders.push(labels);
        }

        smallvec![Effect::Parallel(loaders)]
    }

    fn notes_loader(ids: OrderIdSet, env: &OrderDetailEnvironment) -> Effect<OrderDetailAction> {
        let local = Arc::clone(&env.repository);
        let repository = Arc::clone(&env.repository);
        let network = Arc::clone(&env.network);

        Effect::Sequential(vec![
            async_effect! {
                let notes = local.get_order_notes(ids.id).await;
                Some(OrderDetailAction::NotesLoaded { notes })
            },
            async_effect! {
                if !network.is_connected() {
                    return Some(OrderDetailAction::NotesRefreshed { outcome: Refresh::Skipped });
                }
                let outcome = match repository.fetch_order_notes(ids).await {
                    Ok(()) => Refresh::Fetched(repository.get_order_notes(ids.id).await),
                    Err(error) => Refresh::Failed(error),
                };
                Some(OrderDetailAction::NotesRefreshed { outcome })
            },
        ])
    }

    fn refunds_loader(ids: OrderIdSet, env: &OrderDetailEnvironment) -> Effect<OrderDetailAction> {
        let local = Arc::clone(&env.repository);
        let repository = Arc::clone(&env.repository);
        let network = Arc::clone(&env.network);

        Effect::Sequential(vec![
            async_effect! {
                let refunds = local.get_order_refunds(ids.remote_order_id).await;
                Some(OrderDetailAction::RefundsLoaded { refunds })
            },
            async_effect! {
                let outcome = if network.is_connected() {
                    Refresh::from_result(repository.fetch_order_refunds(ids.remote_order_id).await)
                } else {
                    Refresh::Skipped
                };
                Some(OrderDetailAction::RefundsRefreshed { outcome })
            },
        ])
    }

    fn trackings_loader(
        ids: OrderIdSet,
        env: &OrderDetailEnvironment,
    ) -> Effect<OrderDetailAction> {
        let local = Arc::clone(&env.repository);
        let repository = Arc::clone(&env.repository);
        let network = Arc::clone(&env.network);

        Effect::Sequential(vec![
            async_effect! {
                let trackings = local.get_order_shipment_trackings(ids.id).await;
                Some(OrderDetailAction::TrackingsLoaded { trackings })
            },
            async_effect! {
                if !network.is_connected() {
                    return Some(OrderDetailAction::TrackingsRefreshed {
                        result: RequestResult::NoConnection,
                        trackings: Vec::new(),
                    });
                }
                let result = repository.fetch_order_shipment_tracking_list(ids).await;
                let trackings = if result == RequestResult::Success {
                    repository.get_order_shipment_trackings(ids.id).await
                } else {
                    Vec::new()
                };
                Some(OrderDetailAction::TrackingsRefreshed { result, trackings })
            },
        ])
    }

    /// `None` when shipping labels are switched off; the list is cleared instead
    fn labels_loader(
        state: &OrderDetailState,
        ids: OrderIdSet,
        env: &OrderDetailEnvironment,
    ) -> Option<Effect<OrderDetailAction>> {
        if !env.features.shipping_labels {
            state.sections.shipping_labels.set(Vec::new());
            state.recompute();
            return None;
        }

        let local = Arc::clone(&env.repository);
        let repository = Arc::clone(&env.repository);
        let network = Arc::clone(&env.network);

        Some(Effect::Sequential(vec![
            async_effect! {
                let labels = local.get_order_shipping_labels(ids.remote_order_id).await;
                Some(OrderDetailAction::LabelsLoaded { labels })
            },
            async_effect! {
                let outcome = if network.is_connected() {
                    Refresh::from_result(
                        repository.fetch_order_shipping_labels(ids.remote_order_id).await,
                    )
                } else {
                    Refresh::Skipped
                };
                Some(OrderDetailAction::LabelsRefreshed { outcome })
            },
        ]))
    }

    pub(super) fn reload_labels(
        state: &mut OrderDetailState,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        let Some(ids) = state.ids() else {
            tracing::debug!("Ignoring label refund before the order is loaded");
            return SmallVec::new();
        };
        Self::labels_loader(state, ids, env).into_iter().collect()
    }

    pub(super) fn notes_refreshed(
        state: &mut OrderDetailState,
        outcome: Refresh<Vec<OrderNote>>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        state
            .snapshot
            .apply_patch(&ViewStatePatch::new().notes_skeleton(false));

        match outcome {
            Refresh::Skipped => SmallVec::new(),
            Refresh::Fetched(notes) => {
                state.replace_notes(notes);
                SmallVec::new()
            },
            Refresh::Failed(error) => Self::fetch_failed(env, Section::Notes, &error),
        }
    }

    pub(super) fn refunds_refreshed(
        state: &mut OrderDetailState,
        outcome: Refresh<Vec<Refund>>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        match outcome {
            Refresh::Skipped => SmallVec::new(),
            Refresh::Fetched(refunds) => {
                state.sections.refunds.set(refunds);
                state.recompute();
                SmallVec::new()
            },
            Refresh::Failed(error) => Self::fetch_failed(env, Section::Refunds, &error),
        }
    }

    pub(super) fn trackings_loaded(
        state: &mut OrderDetailState,
        trackings: Vec<OrderShipmentTracking>,
    ) {
        state.replace_trackings(trackings);
    }

    pub(super) fn trackings_refreshed(
        state: &mut OrderDetailState,
        result: RequestResult,
        trackings: Vec<OrderShipmentTracking>,
    ) {
        if result != RequestResult::Success {
            tracing::debug!(?result, "Shipment tracking unavailable");
        }
        state.tracking_result = Some(result);
        state.replace_trackings(trackings);
    }

    pub(super) fn labels_loaded(state: &mut OrderDetailState, labels: Vec<ShippingLabel>) {
        Self::publish_labels(state, labels);
    }

    pub(super) fn labels_refreshed(
        state: &mut OrderDetailState,
        outcome: Refresh<Vec<ShippingLabel>>,
        env: &OrderDetailEnvironment,
    ) -> Effects {
        match outcome {
            Refresh::Skipped => SmallVec::new(),
            Refresh::Fetched(labels) => {
                Self::publish_labels(state, labels);
                SmallVec::new()
            },
            Refresh::Failed(error) => Self::fetch_failed(env, Section::ShippingLabels, &error),
        }
    }

    fn publish_labels(state: &mut OrderDetailState, labels: Vec<ShippingLabel>) {
        let items = state.order().map(|order| order.items).unwrap_or_default();
        let labels = labels
            .into_iter()
            .map(|label| label.with_products(&items))
            .collect();
        state.sections.shipping_labels.set(labels);
        state.recompute();
    }
}
