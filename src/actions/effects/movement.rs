use crate::actions::context::ActionContext;
use crate::actions::outcome::ActionOutcome;
use crate::core::types::{Direction, EntityId};
use crate::entity::genome::Gene;

/// Agile agents cover two cells per move
pub(super) fn walk(ctx: &mut ActionContext<'_>, actor: EntityId, direction: Direction) -> ActionOutcome {
    let env = ctx.facts.environment;
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };

    let steps = if agent.genome.has(Gene::Agile) { 2 } else { 1 };
    let from = agent.position;
    let to = from.offset(direction, steps).clamped(env.width, env.height);
    agent.position = to;

    if to == from {
        ActionOutcome::neutral("move.blocked", format!("stays put at the {} edge", direction.name()))
    } else {
        ActionOutcome::success("move.ok", format!("walks {} to ({}, {})", direction.name(), to.x, to.y))
            .with_reward(0.1)
    }
}
