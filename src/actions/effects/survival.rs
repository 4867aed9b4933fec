use super::{approach, within_reach};
use crate::actions::context::ActionContext;
use crate::actions::outcome::ActionOutcome;
use crate::core::types::EntityId;
use crate::entity::inventory::{Item, Skill};
use crate::entity::needs::NeedType;

const REST_HEALING: f32 = 2.0;
const REST_STRESS_RELIEF: f32 = 5.0;
const MEDICINE_HEALING: f32 = 20.0;

pub(super) fn rest(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let amount = ctx.config.rest_amount;
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    agent.needs.satisfy(NeedType::Fatigue, amount);
    agent.adjust_stress(-REST_STRESS_RELIEF);
    agent.apply_health_delta(REST_HEALING);
    ActionOutcome::success("rest.ok", "rests for a while").with_reward(0.3)
}

pub(super) fn eat(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let amount = ctx.config.eat_amount;
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if !agent.inventory.remove(Item::Food, 1) {
        return ActionOutcome::failure("eat.no_food", "has nothing to eat");
    }
    agent.needs.satisfy(NeedType::Hunger, amount);
    ActionOutcome::success("eat.ok", "eats a meal").with_reward(0.5)
}

/// Carried water first, then a source within reach, otherwise head for the nearest one
pub(super) fn drink(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let amount = ctx.config.drink_amount;
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if agent.inventory.remove(Item::Water, 1) {
        agent.needs.satisfy(NeedType::Thirst, amount);
        return ActionOutcome::success("drink.ok", "drinks from a waterskin").with_reward(0.5);
    }

    let position = agent.position;
    let source = ctx
        .store
        .nearest_place(position, |p| p.stock_of(Item::Water) > 0 && p.usable_by(actor))
        .map(|p| (p.id, p.position, p.name.clone()));
    let Some((source_id, source_pos, source_name)) = source else {
        return ActionOutcome::failure("drink.no_water", "finds no water anywhere");
    };

    if !within_reach(ctx.config, position, source_pos) {
        approach(ctx, actor, source_pos);
        return ActionOutcome::neutral("drink.approach", format!("heads toward {}", source_name));
    }

    if let Some(place) = ctx.store.place_mut(source_id) {
        place.take(1);
    }
    if let Some(agent) = ctx.store.agent_mut(actor) {
        agent.needs.satisfy(NeedType::Thirst, amount);
    }
    ActionOutcome::success("drink.ok", format!("drinks at {}", source_name)).with_reward(0.5)
}

pub(super) fn take_medicine(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if !agent.inventory.remove(Item::Medicine, 1) {
        return ActionOutcome::failure("medicine.none", "has no medicine");
    }
    agent.sickness = None;
    agent.apply_health_delta(MEDICINE_HEALING);
    ActionOutcome::success("medicine.ok", "takes medicine and feels better").with_reward(0.5)
}

fn gathering_skill(item: Item) -> Skill {
    match item {
        Item::Food => Skill::Farming,
        Item::Wood => Skill::Woodcutting,
        Item::Iron | Item::Stone => Skill::Mining,
        _ => Skill::Foraging,
    }
}

/// Take one unit from the nearest usable stock, or walk one step toward it
pub(super) fn gather(ctx: &mut ActionContext<'_>, actor: EntityId, item: Item) -> ActionOutcome {
    let Some(position) = ctx.store.agent(actor).map(|a| a.position) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let source = ctx
        .store
        .nearest_place(position, |p| p.stock_of(item) >= 1 && p.usable_by(actor))
        .map(|p| (p.id, p.position, p.name.clone()));
    let Some((source_id, source_pos, source_name)) = source else {
        return ActionOutcome::failure("gather.no_source", format!("knows of no {} to gather", item.name()));
    };

    if !within_reach(ctx.config, position, source_pos) {
        approach(ctx, actor, source_pos);
        return ActionOutcome::neutral("gather.approach", format!("is moving toward {}", source_name));
    }

    let taken = ctx.store.place_mut(source_id).map_or(0, |p| p.take(1));
    if taken == 0 {
        return ActionOutcome::failure("gather.depleted", format!("{} is exhausted", source_name));
    }

    let increment = ctx.config.skill_increment;
    if let Some(agent) = ctx.store.agent_mut(actor) {
        agent.inventory.add(item, taken);
        agent.skills.raise(gathering_skill(item), increment);
    }
    tracing::debug!(agent = actor.0, item = item.name(), "gathered");
    ActionOutcome::success("gather.ok", format!("gathers {} at {}", item.name(), source_name)).with_reward(0.5)
}

#[cfg(test)]
mod tests {
    use crate::actions::catalog::ActionEffect;
    use crate::actions::outcome::ActionStatus;
    use crate::actions::testing::Fixture;
    use crate::core::types::GridPos;
    use crate::entity::inventory::{Item, Skill};

    #[test]
    fn test_eat_food_consumes_ration() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(2, 2));
        {
            let agent = fx.store.agent_mut(id).unwrap();
            agent.inventory.add(Item::Food, 1);
            agent.needs.hunger = 10.0;
        }
        let outcome = fx.run(id, ActionEffect::Eat);
        assert!(outcome.is_success());
        let agent = fx.store.agent(id).unwrap();
        assert_eq!(agent.needs.hunger, 0.0);
        assert_eq!(agent.inventory.count(Item::Food), 0);
    }

    #[test]
    fn test_eat_without_food_fails() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(2, 2));
        let outcome = fx.run(id, ActionEffect::Eat);
        assert_eq!(outcome.status, ActionStatus::Failure);
        assert_eq!(outcome.log_key, "eat.no_food");
    }

    #[test]
    fn test_gather_in_range_takes_one_unit() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(2, 2));
        let forest = fx.place("Forest", GridPos::new(3, 2), |p| p.with_resource(Item::Wood, 5));
        let outcome = fx.run(id, ActionEffect::Gather(Item::Wood));
        assert!(outcome.is_success());
        assert_eq!(fx.store.place(forest).unwrap().stock_of(Item::Wood), 4);
        let agent = fx.store.agent(id).unwrap();
        assert_eq!(agent.inventory.count(Item::Wood), 1);
        assert!(agent.skills.level(Skill::Woodcutting) > 0.0);
    }

    #[test]
    fn test_gather_out_of_range_steps_toward_source() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(0, 0));
        fx.place("Mine", GridPos::new(6, 3), |p| p.with_resource(Item::Iron, 5));
        let outcome = fx.run(id, ActionEffect::Gather(Item::Iron));
        assert_eq!(outcome.status, ActionStatus::Neutral);
        assert_eq!(fx.store.agent(id).unwrap().position, GridPos::new(1, 1));
        assert_eq!(fx.store.agent(id).unwrap().inventory.count(Item::Iron), 0);
    }

    #[test]
    fn test_gather_skips_private_stock() {
        let mut fx = Fixture::new();
        let owner = fx.agent("Owner", GridPos::new(9, 9));
        let id = fx.agent("Ada", GridPos::new(2, 2));
        fx.place("Orchard", GridPos::new(2, 3), |p| p.with_resource(Item::Food, 5).with_owner(owner));
        let outcome = fx.run(id, ActionEffect::Gather(Item::Food));
        assert_eq!(outcome.log_key, "gather.no_source");
    }

    #[test]
    fn test_drink_walks_to_distant_well() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(0, 0));
        fx.place("Well", GridPos::new(0, 5), |p| p.with_resource(Item::Water, 100));
        let outcome = fx.run(id, ActionEffect::Drink);
        assert_eq!(outcome.log_key, "drink.approach");
        assert_eq!(fx.store.agent(id).unwrap().position, GridPos::new(0, 1));
    }
}
