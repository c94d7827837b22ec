use crate::{
    abstract_trait::order::repository::{DynOrderCommandRepository, DynOrderQueryRepository},
    model::{order::Order, status::Transition},
};
use shared::errors::ServiceError;
use tracing::{info, warn};

pub(crate) struct TransitionOutcome {
    pub order: Order,
    /// False when the order already sat in the target status.
    pub changed: bool,
}

/// Applies `transition` as a compare-and-set on the order's status.
///
/// A lost race resolves by re-reading: if the winner already moved the order
/// into the requested status the call succeeds without writing again.
pub(crate) async fn apply_transition(
    command: &DynOrderCommandRepository,
    query: &DynOrderQueryRepository,
    order_id: &str,
    transition: &Transition,
) -> Result<TransitionOutcome, ServiceError> {
    transition
        .validate()
        .map_err(|msg| ServiceError::Validation(vec![msg]))?;

    let target = transition.target();

    if let Some(order) = command
        .transition_status(
            order_id,
            &transition.allowed_from(),
            target,
            transition.cancel_reason(),
        )
        .await?
    {
        return Ok(TransitionOutcome {
            order,
            changed: true,
        });
    }

    let current = query
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id}")))?;

    if current.status == target {
        info!("⏭️ Order {order_id} is already {target}");
        return Ok(TransitionOutcome {
            order: current,
            changed: false,
        });
    }

    warn!(
        "⚠️ Refusing to move order {order_id} from {} to {target}",
        current.status
    );
    Err(ServiceError::InvalidTransition {
        from: current.status.to_string(),
        to: target.to_string(),
    })
}
