//! Culture, religion and knowledge

use super::neighbor;
use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, SideEffect};
use crate::core::types::EntityId;
use crate::entity::agent::beliefs;
use crate::entity::genome::Gene;
use crate::entity::inventory::Skill;
use crate::entity::psyche::{Drive, Emotion};

/// Score an agent needs toward a recruiter before adopting their ways
const CONVERSION_SCORE: f32 = 30.0;
const PRAYER_RELIEF: f32 = 10.0;

pub(super) fn research(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let increment = ctx.config.skill_increment;
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let Some(culture) = agent.culture_id() else {
        return ActionOutcome::failure("research.no_culture", "has no culture to study for");
    };

    let mut points = 1.0 + agent.skills.level(Skill::Research) / 2.0;
    if agent.genome.has(Gene::Clever) {
        points *= 1.5;
    }
    agent.skills.raise(Skill::Research, increment);
    agent.psyche.add(Drive::Inspiration, 0.1);

    ActionOutcome::success("research.ok", format!("adds {:.1} research", points))
        .with_reward(0.5)
        .with_effect(SideEffect::AddResearch { culture, points })
}

pub(super) fn invent(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let culture = ctx
        .store
        .agent(actor)
        .and_then(|a| a.culture_id())
        .and_then(|c| ctx.store.culture(c));
    let Some(culture) = culture else {
        return ActionOutcome::failure("invent.no_culture", "has no culture to invent for");
    };
    let Some(tech) = ctx.facts.tech_tree.next_affordable(culture) else {
        return ActionOutcome::failure("invent.nothing_affordable", "cannot afford any new technology");
    };

    ActionOutcome::success("invent.ok", format!("invents {}", tech.name))
        .with_reward(1.0)
        .with_effect(SideEffect::InventTechnology { culture: culture.id, tech: tech.id.clone() })
}

pub(super) fn pray(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if agent.religion_id().is_none() {
        return ActionOutcome::failure("pray.no_religion", "has no faith to pray to");
    }
    agent.adjust_stress(-PRAYER_RELIEF);
    agent.emotions.add(Emotion::Joy, 0.1);
    let faith = agent.beliefs.entry(beliefs::FAITH.to_string()).or_insert(0.5);
    *faith = (*faith + 0.02).min(1.0);
    ActionOutcome::success("pray.ok", "prays quietly").with_reward(0.4)
}

pub(super) fn join_culture(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(me) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let mine = me.culture_id();
    let recruiter = neighbor(ctx, actor, |other| {
        other.culture_id().is_some() && other.culture_id() != mine && me.relationships.score(other.id) >= CONVERSION_SCORE
    });
    let Some(culture) = recruiter.and_then(|r| ctx.store.agent(r)).and_then(|r| r.culture_id()) else {
        return ActionOutcome::failure("culture.no_recruiter", "knows nobody whose ways appeal");
    };
    let name = ctx.store.culture(culture).map(|c| c.name.clone()).unwrap_or_default();
    ActionOutcome::success("culture.joined", format!("adopts the ways of {}", name))
        .with_reward(0.6)
        .with_effect(SideEffect::ChangeCulture { agent: actor, culture: Some(culture) })
}

pub(super) fn join_religion(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(me) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let mine = me.religion_id();
    let preacher = neighbor(ctx, actor, |other| {
        other.religion_id().is_some()
            && other.religion_id() != mine
            && me.relationships.score(other.id) >= CONVERSION_SCORE
    });
    let Some(religion) = preacher.and_then(|p| ctx.store.agent(p)).and_then(|p| p.religion_id()) else {
        return ActionOutcome::failure("religion.no_preacher", "hears no faith worth following");
    };
    let name = ctx.store.religion(religion).map(|r| r.name.clone()).unwrap_or_default();
    ActionOutcome::success("religion.joined", format!("converts to {}", name))
        .with_reward(0.6)
        .with_effect(SideEffect::ChangeReligion { agent: actor, religion: Some(religion) })
}

pub(super) fn found_culture(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(founder) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if founder.culture_id().is_some() {
        return ActionOutcome::failure("culture.already_member", "already belongs to a culture");
    }
    if founder.social_status < ctx.config.founding_status {
        return ActionOutcome::failure("culture.low_status", "lacks the standing to lead a people");
    }
    let name = format!("{} Folk", founder.name);
    ActionOutcome::success("culture.founded", format!("founds the {}", name))
        .with_reward(1.0)
        .with_effect(SideEffect::CreateCulture { founder: actor, name, beliefs: founder.beliefs.clone() })
}

pub(super) fn found_religion(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(founder) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if founder.religion_id().is_some() {
        return ActionOutcome::failure("religion.already_member", "already keeps a faith");
    }
    if founder.social_status < ctx.config.founding_status {
        return ActionOutcome::failure("religion.low_status", "lacks the standing to found a faith");
    }
    let mut dogma = founder.beliefs.clone();
    let faith = dogma.entry(beliefs::FAITH.to_string()).or_insert(0.5);
    *faith = faith.max(0.8);
    let name = format!("Faith of {}", founder.name);
    ActionOutcome::success("religion.founded", format!("founds the {}", name))
        .with_reward(1.0)
        .with_effect(SideEffect::CreateReligion { founder: actor, name, dogma })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::actions::catalog::ActionEffect;
    use crate::actions::outcome::SideEffect;
    use crate::actions::testing::Fixture;
    use crate::core::types::GridPos;

    #[test]
    fn test_research_scales_with_skill() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(1, 1));
        let culture = fx.store.create_culture("Scholars", BTreeMap::new());
        fx.store.set_culture(id, Some(culture)).unwrap();
        fx.store.agent_mut(id).unwrap().skills.raise(crate::entity::inventory::Skill::Research, 2.0);

        let outcome = fx.run(id, ActionEffect::Research);
        assert_eq!(outcome.side_effects, vec![SideEffect::AddResearch { culture, points: 2.0 }]);
    }

    #[test]
    fn test_invent_picks_cheapest_affordable() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(1, 1));
        let culture = fx.store.create_culture("Scholars", BTreeMap::new());
        fx.store.set_culture(id, Some(culture)).unwrap();
        assert_eq!(fx.run(id, ActionEffect::InventTechnology).log_key, "invent.nothing_affordable");

        fx.store.culture_mut(culture).unwrap().add_research(16.0);
        let outcome = fx.run(id, ActionEffect::InventTechnology);
        assert_eq!(outcome.side_effects, vec![SideEffect::InventTechnology { culture, tech: "agriculture".into() }]);
    }

    #[test]
    fn test_join_culture_needs_liked_recruiter() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(1, 1));
        let recruiter = fx.agent("Bo", GridPos::new(2, 1));
        let culture = fx.store.create_culture("Riverfolk", BTreeMap::new());
        fx.store.set_culture(recruiter, Some(culture)).unwrap();
        assert_eq!(fx.run(id, ActionEffect::JoinCulture).log_key, "culture.no_recruiter");

        fx.store.agent_mut(id).unwrap().relationships.ensure(recruiter).set_score(40.0);
        let outcome = fx.run(id, ActionEffect::JoinCulture);
        assert_eq!(outcome.side_effects, vec![SideEffect::ChangeCulture { agent: id, culture: Some(culture) }]);
    }

    #[test]
    fn test_pray_requires_religion() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(1, 1));
        assert_eq!(fx.run(id, ActionEffect::Pray).log_key, "pray.no_religion");
    }

    #[test]
    fn test_found_religion_boosts_faith() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(1, 1));
        let outcome = fx.run(id, ActionEffect::FoundReligion);
        match &outcome.side_effects[..] {
            [SideEffect::CreateReligion { dogma, .. }] => assert_eq!(dogma["faith"], 0.8),
            other => panic!("unexpected side effects: {:?}", other),
        }
    }
}
