use super::crime::{intercept, intercepted};
use super::neighbor;
use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, SideEffect};
use crate::core::types::EntityId;
use crate::entity::agent::{Trauma, TraumaKind};
use crate::entity::genome::Gene;
use crate::entity::inventory::Skill;
use crate::entity::psyche::{Drive, Emotion};
use crate::entity::relationships::{DispositionKind, RelationshipType};
use crate::entity::social::{SocialEvent, SocialEventKind};
use crate::society::government::Offense;

const TALK_SCORE_GAIN: f32 = 3.0;
const FIGHT_SCORE_LOSS: f32 = 10.0;

pub(super) fn talk(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(other) = neighbor(ctx, actor, |a| !a.is_imprisoned()) else {
        return ActionOutcome::failure("talk.nobody", "has nobody to talk to");
    };
    let tick = ctx.facts.tick;
    let trust = ctx.config.conversation_trust_gain;

    let names = ctx.store.with_pair_mut(actor, other, |a, b| {
        let (a_id, b_id) = (a.id, b.id);
        for (me, them) in [(&mut *a, b_id), (&mut *b, a_id)] {
            let relation = me.relationships.ensure(them);
            relation.add_score(TALK_SCORE_GAIN);
            relation.disposition.add(DispositionKind::Trust, trust);
            me.emotions.add(Emotion::Joy, 0.1);
            me.psyche.add(Drive::Boredom, -0.2);
            me.remember(SocialEvent::new(tick, SocialEventKind::Conversation, them, "small talk"));
        }
        b.name.clone()
    });
    match names {
        Some(name) => ActionOutcome::success("talk.ok", format!("chats with {}", name)).with_reward(0.4),
        None => ActionOutcome::failure("talk.nobody", "has nobody to talk to"),
    }
}

pub(super) fn fight(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(target) = neighbor(ctx, actor, |_| true) else {
        return ActionOutcome::failure("fight.no_target", "finds nobody to fight");
    };
    if let Some(interception) = intercept(ctx, actor, Offense::Fighting) {
        return intercepted(ctx, actor, interception, "fight");
    }

    let (attack, strong) = match ctx.store.agent(actor) {
        Some(a) => (a.skills.level(Skill::Combat), a.genome.has(Gene::Strong)),
        None => return ActionOutcome::failure("agent.unavailable", "agent vanished"),
    };
    let defense = ctx.store.agent(target).map_or(0.0, |d| d.skills.level(Skill::Combat));
    let roll = ctx.rng.range_f32(0.0, 10.0);
    let bonus = if strong { 5.0 } else { 0.0 };
    let damage = (10.0 + (attack - defense) * 5.0 + roll + bonus).max(1.0);

    let tick = ctx.facts.tick;
    let increment = ctx.config.skill_increment;
    let result = ctx.store.with_pair_mut(actor, target, |attacker, defender| {
        let killed = defender.apply_health_delta(-damage);

        let (attacker_id, defender_id) = (attacker.id, defender.id);
        for (me, them) in [(&mut *attacker, defender_id), (&mut *defender, attacker_id)] {
            let relation = me.relationships.ensure(them);
            relation.add_score(-FIGHT_SCORE_LOSS);
            if relation.kind != RelationshipType::Spouse {
                relation.kind = RelationshipType::Rival;
            }
            me.remember(SocialEvent::new(tick, SocialEventKind::Fight, them, "came to blows"));
        }

        let grudge = defender.relationships.ensure(attacker.id);
        grudge.disposition.add(DispositionKind::Anger, 0.4);
        grudge.disposition.add(DispositionKind::Fear, 0.2);
        defender.emotions.add(Emotion::Fear, 0.3);
        defender.emotions.add(Emotion::Anger, 0.3);
        defender.psyche.add(Drive::Vengefulness, 0.3);
        defender.adjust_stress(10.0);
        defender.traumas.push(Trauma {
            kind: TraumaKind::Assault,
            tick,
            severity: (damage / 100.0).min(1.0),
            source: Some(attacker.id),
        });
        defender.skills.raise(Skill::Combat, increment / 2.0);
        attacker.skills.raise(Skill::Combat, increment);
        attacker.emotions.add(Emotion::Anger, 0.1);

        (killed, defender.name.clone())
    });

    let Some((killed, victim)) = result else {
        return ActionOutcome::failure("fight.no_target", "finds nobody to fight");
    };
    if killed {
        let cause = match ctx.store.agent(actor) {
            Some(a) => format!("killed by {}", a.name),
            None => "killed in a fight".to_string(),
        };
        return ActionOutcome::success("fight.killed", format!("kills {}", victim))
            .with_reward(0.2)
            .with_effect(SideEffect::RecordDeath { agent: target, cause });
    }
    ActionOutcome::success("fight.ok", format!("hits {} for {:.0} damage", victim, damage)).with_reward(0.2)
}

pub(super) fn steal(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(victim) = neighbor(ctx, actor, |a| a.inventory.most_plentiful().is_some()) else {
        return ActionOutcome::failure("steal.no_target", "finds nobody worth robbing");
    };
    if let Some(interception) = intercept(ctx, actor, Offense::Stealing) {
        return intercepted(ctx, actor, interception, "steal");
    }

    let stealth = ctx.store.agent(actor).map_or(0.0, |a| a.skills.level(Skill::Stealth));
    let success = ctx.rng.chance((0.3 + stealth * 0.1).min(0.9));
    let tick = ctx.facts.tick;
    let increment = ctx.config.skill_increment;

    let report = ctx.store.with_pair_mut(actor, victim, |thief, mark| {
        if success {
            let item = mark.inventory.most_plentiful()?;
            mark.inventory.remove(item, 1);
            thief.inventory.add(item, 1);
            thief.skills.raise(Skill::Stealth, increment);
            mark.remember(SocialEvent::new(tick, SocialEventKind::Theft, thief.id, "something went missing"));
            Some(Ok((item, mark.name.clone())))
        } else {
            let relation = mark.relationships.ensure(thief.id);
            relation.add_score(-FIGHT_SCORE_LOSS);
            if !relation.kind.is_sticky() {
                relation.kind = RelationshipType::Rival;
            }
            relation.disposition.add(DispositionKind::Anger, 0.3);
            mark.emotions.add(Emotion::Anger, 0.2);
            mark.remember(SocialEvent::new(tick, SocialEventKind::Theft, thief.id, "caught a thief"));
            Some(Err(mark.name.clone()))
        }
    });

    match report.flatten() {
        Some(Ok((item, name))) => {
            ActionOutcome::success("steal.ok", format!("steals {} from {}", item.name(), name)).with_reward(0.5)
        }
        Some(Err(name)) => ActionOutcome::failure("steal.caught", format!("is caught stealing by {}", name)),
        None => ActionOutcome::failure("steal.no_target", "finds nothing to take"),
    }
}

#[cfg(test)]
mod tests {
    use crate::actions::catalog::ActionEffect;
    use crate::actions::outcome::{ActionStatus, SideEffect};
    use crate::actions::testing::Fixture;
    use crate::core::types::GridPos;
    use crate::entity::inventory::Item;
    use crate::entity::place::PlaceRole;
    use crate::entity::relationships::RelationshipType;
    use crate::society::government::{Law, Offense};

    #[test]
    fn test_talk_raises_both_scores() {
        let mut fx = Fixture::new();
        let a = fx.agent("Ada", GridPos::new(1, 1));
        let b = fx.agent("Bo", GridPos::new(2, 1));
        assert!(fx.run(a, ActionEffect::Talk).is_success());
        assert!(fx.store.agent(a).unwrap().relationships.score(b) > 0.0);
        assert!(fx.store.agent(b).unwrap().relationships.score(a) > 0.0);
        assert_eq!(fx.store.agent(b).unwrap().social_memory.len(), 1);
    }

    #[test]
    fn test_fight_wounds_and_makes_rivals() {
        let mut fx = Fixture::new();
        let a = fx.agent("Ada", GridPos::new(1, 1));
        let b = fx.agent("Bo", GridPos::new(2, 1));
        fx.script([0.0]);
        let outcome = fx.run(a, ActionEffect::Fight);
        assert!(outcome.is_success());
        let victim = fx.store.agent(b).unwrap();
        assert_eq!(victim.health, 90.0);
        assert_eq!(victim.relationships.kind(a), Some(RelationshipType::Rival));
        assert_eq!(victim.traumas.len(), 1);
    }

    #[test]
    fn test_guard_warns_without_jail() {
        let mut fx = Fixture::new();
        fx.government.enact(Law::against(Offense::Fighting, 10));
        let a = fx.agent("Ada", GridPos::new(1, 1));
        let b = fx.agent("Bo", GridPos::new(2, 1));
        let guard = fx.agent("Guard", GridPos::new(4, 4));
        fx.store.agent_mut(guard).unwrap().role = Some("guard".into());

        let outcome = fx.run(a, ActionEffect::Fight);
        assert_eq!(outcome.log_key, "fight.warned");
        assert_eq!(fx.store.agent(b).unwrap().health, 100.0);
        assert_eq!(fx.store.agent(a).unwrap().social_status, 40.0);
    }

    #[test]
    fn test_guard_arrests_when_jail_exists() {
        let mut fx = Fixture::new();
        fx.government.enact(Law::against(Offense::Fighting, 20));
        let a = fx.agent("Ada", GridPos::new(1, 1));
        fx.agent("Bo", GridPos::new(2, 1));
        let guard = fx.agent("Guard", GridPos::new(3, 3));
        fx.store.agent_mut(guard).unwrap().role = Some("guard".into());
        let jail = fx.place("Jail", GridPos::new(8, 8), |p| p.with_role(PlaceRole::Jail { inmates: Vec::new() }));
        fx.script([0.1]);

        let outcome = fx.run(a, ActionEffect::Fight);
        assert_eq!(outcome.status, ActionStatus::Failure);
        assert_eq!(outcome.log_key, "fight.arrested");
        assert_eq!(outcome.side_effects, vec![SideEffect::Imprison { agent: a, jail, duration: 25 }]);
    }

    #[test]
    fn test_unlawful_act_without_guard_proceeds() {
        let mut fx = Fixture::new();
        fx.government.enact(Law::against(Offense::Fighting, 10));
        let a = fx.agent("Ada", GridPos::new(1, 1));
        fx.agent("Bo", GridPos::new(2, 1));
        assert!(fx.run(a, ActionEffect::Fight).is_success());
    }

    #[test]
    fn test_successful_theft_moves_one_item() {
        let mut fx = Fixture::new();
        let thief = fx.agent("Ada", GridPos::new(1, 1));
        let mark = fx.agent("Bo", GridPos::new(2, 1));
        fx.store.agent_mut(mark).unwrap().inventory.add(Item::Iron, 2);
        fx.script([0.0]);
        assert!(fx.run(thief, ActionEffect::Steal).is_success());
        assert_eq!(fx.store.agent(thief).unwrap().inventory.count(Item::Iron), 1);
        assert_eq!(fx.store.agent(mark).unwrap().inventory.count(Item::Iron), 1);
    }

    #[test]
    fn test_failed_theft_angers_victim() {
        let mut fx = Fixture::new();
        let thief = fx.agent("Ada", GridPos::new(1, 1));
        let mark = fx.agent("Bo", GridPos::new(2, 1));
        fx.store.agent_mut(mark).unwrap().inventory.add(Item::Iron, 2);
        fx.script([0.95]);
        assert_eq!(fx.run(thief, ActionEffect::Steal).log_key, "steal.caught");
        assert_eq!(fx.store.agent(mark).unwrap().relationships.kind(thief), Some(RelationshipType::Rival));
        assert_eq!(fx.store.agent(thief).unwrap().inventory.count(Item::Iron), 0);
    }
}
