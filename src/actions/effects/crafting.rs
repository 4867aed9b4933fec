use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, PlaceSpec, SideEffect};
use crate::actions::recipes::RecipeId;
use crate::core::types::EntityId;
use crate::entity::inventory::{Item, Skill};
use crate::entity::place::PlaceRole;

const HOUSE_MATERIALS: &[(Item, u32)] = &[(Item::Wood, 5), (Item::Stone, 3)];

pub(super) fn craft(ctx: &mut ActionContext<'_>, actor: EntityId, recipe_id: RecipeId) -> ActionOutcome {
    let recipe = recipe_id.recipe();
    let Some(agent) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let (output, count) = recipe.output;

    if let Some(tech) = recipe.technology {
        let known = agent
            .culture_id()
            .and_then(|c| ctx.store.culture(c))
            .map_or(false, |c| c.knows(tech));
        if !known {
            return ActionOutcome::failure(
                "craft.missing_technology",
                format!("does not know how to make {} without {}", output.name(), tech),
            );
        }
    }
    if agent.skills.level(Skill::Crafting) < recipe.min_skill {
        return ActionOutcome::failure("craft.low_skill", format!("lacks the skill to make {}", output.name()));
    }

    let increment = ctx.config.skill_increment;
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if !agent.inventory.remove_all(recipe.ingredients) {
        return ActionOutcome::failure(
            "craft.missing_ingredients",
            format!("lacks the materials for {}", output.name()),
        );
    }
    agent.inventory.add(output, count);
    agent.skills.raise(Skill::Crafting, increment);
    ActionOutcome::success("craft.ok", format!("crafts {}", output.name())).with_reward(0.8)
}

/// Consumes materials now; the house itself is created by the engine
pub(super) fn build_house(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let increment = ctx.config.skill_increment;
    let Some(agent) = ctx.store.agent_mut(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    if !agent.inventory.remove_all(HOUSE_MATERIALS) {
        return ActionOutcome::failure("build.missing_materials", "lacks the wood and stone for a house");
    }
    agent.skills.raise(Skill::Crafting, increment);

    let spec = PlaceSpec {
        name: format!("{}'s House", agent.name),
        description: format!("A modest house built by {}", agent.name),
        position: agent.position,
        resource: None,
        owner: Some(actor),
        role: Some(PlaceRole::House),
    };
    ActionOutcome::success("build.ok", "builds a house")
        .with_reward(1.0)
        .with_effect(SideEffect::CreateEntity(spec))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::actions::catalog::ActionEffect;
    use crate::actions::outcome::{ActionStatus, SideEffect};
    use crate::actions::recipes::RecipeId;
    use crate::actions::testing::Fixture;
    use crate::core::types::GridPos;
    use crate::entity::inventory::Item;

    #[test]
    fn test_spear_needs_every_ingredient() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(2, 2));
        fx.store.agent_mut(id).unwrap().inventory.add(Item::Wood, 2);

        let outcome = fx.run(id, ActionEffect::Craft(RecipeId::Spear));
        assert_eq!(outcome.status, ActionStatus::Failure);
        assert_eq!(outcome.log_key, "craft.missing_ingredients");
        let agent = fx.store.agent(id).unwrap();
        assert_eq!(agent.inventory.count(Item::Wood), 2);
        assert_eq!(agent.inventory.count(Item::Spear), 0);
    }

    #[test]
    fn test_spear_crafted_when_stocked() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(2, 2));
        {
            let inventory = &mut fx.store.agent_mut(id).unwrap().inventory;
            inventory.add(Item::Wood, 3);
            inventory.add(Item::Stone, 1);
        }
        let outcome = fx.run(id, ActionEffect::Craft(RecipeId::Spear));
        assert!(outcome.is_success());
        let agent = fx.store.agent(id).unwrap();
        assert_eq!(agent.inventory.count(Item::Wood), 1);
        assert_eq!(agent.inventory.count(Item::Stone), 0);
        assert_eq!(agent.inventory.count(Item::Spear), 1);
    }

    #[test]
    fn test_tools_gated_by_culture_technology() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(2, 2));
        {
            let inventory = &mut fx.store.agent_mut(id).unwrap().inventory;
            inventory.add(Item::Wood, 1);
            inventory.add(Item::Iron, 1);
        }
        assert_eq!(fx.run(id, ActionEffect::Craft(RecipeId::Tools)).log_key, "craft.missing_technology");

        let culture = fx.store.create_culture("Smiths", BTreeMap::new());
        fx.store.culture_mut(culture).unwrap().learn("toolmaking");
        fx.store.set_culture(id, Some(culture)).unwrap();
        assert!(fx.run(id, ActionEffect::Craft(RecipeId::Tools)).is_success());
        assert_eq!(fx.store.agent(id).unwrap().inventory.count(Item::Tools), 1);
    }

    #[test]
    fn test_build_house_requests_entity() {
        let mut fx = Fixture::new();
        let id = fx.agent("Ada", GridPos::new(4, 4));
        {
            let inventory = &mut fx.store.agent_mut(id).unwrap().inventory;
            inventory.add(Item::Wood, 5);
            inventory.add(Item::Stone, 3);
        }
        let outcome = fx.run(id, ActionEffect::BuildHouse);
        assert!(outcome.is_success());
        match &outcome.side_effects[..] {
            [SideEffect::CreateEntity(spec)] => {
                assert_eq!(spec.owner, Some(id));
                assert_eq!(spec.position, GridPos::new(4, 4));
            }
            other => panic!("unexpected side effects: {:?}", other),
        }
    }
}
