use super::neighbor;
use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, SideEffect};
use crate::core::types::EntityId;
use crate::entity::psyche::Emotion;
use crate::entity::relationships::RelationshipType;
use crate::entity::social::{SocialEvent, SocialEventKind};

/// Minimum affection before a proposal is possible
const PROPOSAL_SCORE: f32 = 60.0;

pub(super) fn propose_marriage(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(me) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if me.relationships.spouse().is_some() {
        return ActionOutcome::failure("marriage.already_married", "is already married");
    }

    let beloved = neighbor(ctx, actor, |other| {
        let close = matches!(
            me.relationships.kind(other.id),
            Some(RelationshipType::Friend) | Some(RelationshipType::Partner)
        );
        close && me.relationships.score(other.id) >= PROPOSAL_SCORE && other.relationships.spouse().is_none()
    });
    let Some(beloved) = beloved else {
        return ActionOutcome::failure("marriage.no_candidate", "has nobody to propose to");
    };

    let acceptance = ctx.store.agent(beloved).map_or(0.0, |b| b.relationships.score(actor) / 100.0);
    let accepted = ctx.rng.chance(acceptance);
    let tick = ctx.facts.tick;

    let name = ctx.store.with_pair_mut(actor, beloved, |suitor, other| {
        if accepted {
            let (suitor_id, other_id) = (suitor.id, other.id);
            for (me, them) in [(&mut *suitor, other_id), (&mut *other, suitor_id)] {
                me.relationships.ensure(them).kind = RelationshipType::Spouse;
                me.emotions.add(Emotion::Joy, 0.4);
                me.remember(SocialEvent::new(tick, SocialEventKind::Marriage, them, "married"));
            }
        } else {
            suitor.emotions.add(Emotion::Sadness, 0.2);
        }
        other.name.clone()
    });
    let name = name.unwrap_or_default();

    if accepted {
        tracing::info!(a = actor.0, b = beloved.0, "marriage");
        ActionOutcome::success("marriage.ok", format!("marries {}", name)).with_reward(1.0)
    } else {
        ActionOutcome::failure("marriage.rejected", format!("is turned down by {}", name))
    }
}

/// Spouses of fertile age, side by side and under the offspring cap, may conceive
pub(super) fn reproduce(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let config = ctx.config;
    let Some(me) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let partner = me
        .relationships
        .spouse()
        .and_then(|s| ctx.store.agent(s))
        .filter(|p| p.is_alive() && p.relationships.kind(actor) == Some(RelationshipType::Spouse));
    let Some(partner) = partner else {
        return ActionOutcome::failure("reproduce.no_spouse", "has no living spouse");
    };

    let fertile = |age: f32| age >= config.min_reproduction_age && age <= config.max_reproduction_age;
    if !fertile(me.age) || !fertile(partner.age) {
        return ActionOutcome::failure("reproduce.age", "is not of child-bearing age");
    }
    if me.position.distance(&partner.position) > config.proximity_threshold {
        return ActionOutcome::failure("reproduce.too_far", format!("is too far from {}", partner.name));
    }
    if me.offspring >= config.offspring_cap || partner.offspring >= config.offspring_cap {
        return ActionOutcome::failure("reproduce.cap", "already has enough children");
    }

    let (partner_id, position) = (partner.id, me.position);
    if !ctx.rng.chance(config.conception_chance) {
        return ActionOutcome::neutral("reproduce.no_conception", "tries for a child without luck");
    }

    ctx.store.with_pair_mut(actor, partner_id, |a, b| {
        a.offspring += 1;
        b.offspring += 1;
        a.emotions.add(Emotion::Joy, 0.5);
        b.emotions.add(Emotion::Joy, 0.5);
    });
    ActionOutcome::success("reproduce.ok", "is expecting a child")
        .with_reward(1.0)
        .with_effect(SideEffect::CreateAgent { parents: (actor, partner_id), position })
}
