//! Action procedures
//!
//! Each procedure validates its preconditions first and touches state only
//! once every check has passed, so a failed action leaves the world as it was.

mod crafting;
mod crime;
mod economy;
mod family;
mod faith;
mod movement;
mod politics;
mod social;
mod survival;

use crate::actions::catalog::ActionEffect;
use crate::actions::context::ActionContext;
use crate::actions::outcome::ActionOutcome;
use crate::core::config::SimConfig;
use crate::core::types::{EntityId, GridPos};
use crate::entity::agent::Agent;

pub use crime::{intercept, Interception, GUARD_ROLE};

impl ActionEffect {
    /// Run this effect for `actor`. Dead or missing actors always fail.
    pub fn execute(&self, actor: EntityId, ctx: &mut ActionContext<'_>) -> ActionOutcome {
        if !ctx.store.agent(actor).map_or(false, Agent::is_alive) {
            return ActionOutcome::failure("agent.unavailable", format!("agent {} cannot act", actor));
        }

        match *self {
            ActionEffect::Move(direction) => movement::walk(ctx, actor, direction),
            ActionEffect::Rest => survival::rest(ctx, actor),
            ActionEffect::Eat => survival::eat(ctx, actor),
            ActionEffect::Drink => survival::drink(ctx, actor),
            ActionEffect::TakeMedicine => survival::take_medicine(ctx, actor),
            ActionEffect::Gather(item) => survival::gather(ctx, actor, item),
            ActionEffect::Craft(recipe) => crafting::craft(ctx, actor, recipe),
            ActionEffect::BuildHouse => crafting::build_house(ctx, actor),
            ActionEffect::FoundBusiness => economy::found_business(ctx, actor),
            ActionEffect::Work => economy::work(ctx, actor),
            ActionEffect::ListItem => economy::list_item(ctx, actor),
            ActionEffect::BuyItem => economy::buy_item(ctx, actor),
            ActionEffect::Talk => social::talk(ctx, actor),
            ActionEffect::Fight => social::fight(ctx, actor),
            ActionEffect::Steal => social::steal(ctx, actor),
            ActionEffect::ProposeMarriage => family::propose_marriage(ctx, actor),
            ActionEffect::Reproduce => family::reproduce(ctx, actor),
            ActionEffect::Vote => politics::vote(ctx, actor),
            ActionEffect::RunForOffice => politics::run_for_office(ctx, actor),
            ActionEffect::ProposeLaw => politics::propose_law(ctx, actor),
            ActionEffect::Research => faith::research(ctx, actor),
            ActionEffect::InventTechnology => faith::invent(ctx, actor),
            ActionEffect::Pray => faith::pray(ctx, actor),
            ActionEffect::JoinCulture => faith::join_culture(ctx, actor),
            ActionEffect::JoinReligion => faith::join_religion(ctx, actor),
            ActionEffect::FoundCulture => faith::found_culture(ctx, actor),
            ActionEffect::FoundReligion => faith::found_religion(ctx, actor),
            ActionEffect::Narrative => ActionOutcome::neutral("narrative", "acts out a scene"),
        }
    }
}

/// The acting agent; `execute` has already checked it exists
fn actor_ref<'s>(ctx: &'s ActionContext<'_>, actor: EntityId) -> Option<&'s Agent> {
    ctx.store.agent(actor)
}

/// Closest living agent within conversation range of the actor
fn neighbor(ctx: &ActionContext<'_>, actor: EntityId, filter: impl Fn(&Agent) -> bool) -> Option<EntityId> {
    let position = ctx.store.agent(actor)?.position;
    ctx.store
        .nearest_agent(position, ctx.config.proximity_threshold, actor, filter)
        .map(|a| a.id)
}

/// Move the actor a single cell toward `target`, staying on the grid
fn approach(ctx: &mut ActionContext<'_>, actor: EntityId, target: GridPos) {
    let env = ctx.facts.environment;
    if let Some(agent) = ctx.store.agent_mut(actor) {
        agent.position = agent.position.step_toward(target).clamped(env.width, env.height);
    }
}

fn within_reach(config: &SimConfig, from: GridPos, to: GridPos) -> bool {
    from.distance(&to) < config.interaction_range
}
