//! Guard interception of outlawed acts

use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, SideEffect};
use crate::core::types::EntityId;
use crate::entity::psyche::Drive;
use crate::society::government::Offense;

pub const GUARD_ROLE: &str = "guard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    Arrested { guard: EntityId, jail: EntityId, duration: u64 },
    Warned { guard: EntityId },
}

/// A living guard within range stops any act a law forbids.
/// Arrest needs a jail; otherwise the offender only gets a warning.
pub fn intercept(ctx: &mut ActionContext<'_>, offender: EntityId, offense: Offense) -> Option<Interception> {
    let law = ctx.facts.government.law_against(offense)?;
    let culprit = ctx.store.agent(offender)?;
    let position = culprit.position;

    // Harsher sentences for the vengeful and the disagreeable
    let temper = 1.0 + culprit.psyche.get(Drive::Vengefulness) * 0.5 + (1.0 - culprit.personality.agreeableness) * 0.5;
    let duration = ((law.punishment as f32 * temper).round() as u64).max(1);

    let guard = ctx.store.nearest_agent(position, ctx.config.guard_range, offender, |a| {
        a.role.as_deref() == Some(GUARD_ROLE) && !a.is_imprisoned()
    })?;
    let guard_id = guard.id;
    let arrest_chance =
        (0.5 + guard.psyche.get(Drive::Vengefulness) * 0.3 - guard.personality.agreeableness * 0.2).clamp(0.1, 0.9);

    let jail = ctx.store.nearest_place(position, |p| p.is_jail()).map(|p| p.id);
    match jail {
        Some(jail) if ctx.rng.chance(arrest_chance) => Some(Interception::Arrested { guard: guard_id, jail, duration }),
        _ => Some(Interception::Warned { guard: guard_id }),
    }
}

/// Turn an interception into the failed outcome of the attempted act
pub(super) fn intercepted(
    ctx: &mut ActionContext<'_>,
    offender: EntityId,
    interception: Interception,
    act: &str,
) -> ActionOutcome {
    let guard_name = |ctx: &ActionContext<'_>, guard: EntityId| {
        ctx.store.agent(guard).map(|g| g.name.clone()).unwrap_or_else(|| "a guard".to_string())
    };

    match interception {
        Interception::Arrested { guard, jail, duration } => {
            let name = guard_name(ctx, guard);
            tracing::info!(offender = offender.0, guard = guard.0, duration, "arrest");
            ActionOutcome::failure(&format!("{}.arrested", act), format!("is arrested by {} for {} ticks", name, duration))
                .with_effect(SideEffect::Imprison { agent: offender, jail, duration })
        }
        Interception::Warned { guard } => {
            let name = guard_name(ctx, guard);
            let penalty = ctx.config.warning_status_penalty;
            if let Some(agent) = ctx.store.agent_mut(offender) {
                agent.adjust_status(-penalty);
            }
            ActionOutcome::failure(&format!("{}.warned", act), format!("is stopped and warned by {}", name))
        }
    }
}
