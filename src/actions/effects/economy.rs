use super::within_reach;
use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, SideEffect};
use crate::core::types::EntityId;
use crate::entity::inventory::Skill;
use crate::entity::place::Listing;
use crate::society::economy::Transaction;

/// Buy the nearest unowned resource site within reach
pub(super) fn found_business(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let cost = ctx.config.business_cost;
    let Some(agent) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let (position, funds) = (agent.position, agent.currency);

    let site = ctx
        .store
        .nearest_place(position, |p| p.owner.is_none() && p.resource.is_some())
        .filter(|p| within_reach(ctx.config, position, p.position))
        .map(|p| p.id);
    let Some(site) = site else {
        return ActionOutcome::failure("business.no_site", "finds no free site to claim");
    };
    if funds < cost {
        return ActionOutcome::failure("business.no_funds", format!("cannot afford the {} coin price", cost));
    }

    let name = match ctx.store.place_mut(site) {
        Some(place) => {
            place.owner = Some(actor);
            place.name.clone()
        }
        None => return ActionOutcome::failure("business.no_site", "the site is gone"),
    };
    if let Some(agent) = ctx.store.agent_mut(actor) {
        agent.currency -= cost;
        agent.adjust_status(5.0);
    }
    ActionOutcome::success("business.ok", format!("buys {} and opens a business", name)).with_reward(1.0)
}

/// Labor at someone else's site: the owner pays a wage and receives the produce
pub(super) fn work(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let wage = ctx.config.wage;
    let Some(position) = ctx.store.agent(actor).map(|a| a.position) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };

    let store = &*ctx.store;
    let site = store
        .nearest_place(position, |p| {
            let employer_alive = p.owner.and_then(|o| store.agent(o)).map_or(false, |o| o.is_alive());
            p.owner != Some(actor) && employer_alive && p.resource.as_ref().map_or(false, |r| r.quantity > 0)
        })
        .filter(|p| within_reach(ctx.config, position, p.position))
        .and_then(|p| Some((p.id, p.owner?, p.resource.as_ref()?.item, p.name.clone())));
    let Some((site, owner, item, site_name)) = site else {
        return ActionOutcome::failure("work.no_employer", "finds no work nearby");
    };
    if ctx.store.agent(owner).map_or(0, |o| o.currency) < wage {
        return ActionOutcome::failure("work.unpaid", "the owner cannot pay a wage");
    }

    let taken = ctx.store.place_mut(site).map_or(0, |p| p.take(1));
    if taken == 0 {
        return ActionOutcome::failure("work.no_employer", "the site is exhausted");
    }
    let increment = ctx.config.skill_increment;
    ctx.store.with_pair_mut(actor, owner, |worker, employer| {
        employer.currency -= wage;
        employer.inventory.add(item, taken);
        worker.currency += wage;
        worker.skills.raise(Skill::Trading, increment);
    });
    ActionOutcome::success("work.ok", format!("works at {} for {} coins", site_name, wage)).with_reward(0.6)
}

/// Put the most plentiful carried good up for sale at a nearby marketplace
pub(super) fn list_item(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(agent) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let position = agent.position;
    let item = agent.inventory.most_plentiful();

    let market = ctx
        .store
        .nearest_place(position, |p| p.is_marketplace())
        .filter(|p| within_reach(ctx.config, position, p.position))
        .map(|p| p.id);
    let Some(market) = market else {
        return ActionOutcome::failure("market.no_market", "is not near a marketplace");
    };
    let Some(item) = item else {
        return ActionOutcome::failure("market.nothing_to_sell", "has nothing to sell");
    };

    if let Some(agent) = ctx.store.agent_mut(actor) {
        agent.inventory.remove(item, 1);
    }
    if let Some(listings) = ctx.store.place_mut(market).and_then(|p| p.listings_mut()) {
        match listings.iter_mut().find(|l| l.seller == actor && l.item == item) {
            Some(listing) => listing.quantity += 1,
            None => listings.push(Listing { seller: actor, item, quantity: 1 }),
        }
    }
    ActionOutcome::success("market.listed", format!("lists {} for sale", item.name())).with_reward(0.4)
}

/// Buy the first affordable listing from another living seller
pub(super) fn buy_item(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let prices = ctx.facts.prices;
    let tick = ctx.facts.tick;
    let Some(agent) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let (position, funds) = (agent.position, agent.currency);

    let store = &*ctx.store;
    let market = store
        .nearest_place(position, |p| p.is_marketplace())
        .filter(|p| within_reach(ctx.config, position, p.position));
    let Some(market) = market else {
        return ActionOutcome::failure("market.no_market", "is not near a marketplace");
    };
    let market_id = market.id;
    let deal = market
        .listings()
        .iter()
        .enumerate()
        .filter(|(_, l)| l.seller != actor && l.quantity > 0)
        .filter(|(_, l)| store.agent(l.seller).map_or(false, |s| s.is_alive()))
        .find(|(_, l)| prices.price(l.item) <= funds)
        .map(|(index, l)| (index, l.seller, l.item, prices.price(l.item)));
    let Some((index, seller, item, price)) = deal else {
        return ActionOutcome::failure("market.nothing_affordable", "can afford nothing on offer");
    };

    let paid = ctx.store.with_pair_mut(actor, seller, |buyer, seller| {
        buyer.currency -= price;
        buyer.inventory.add(item, 1);
        buyer.skills.raise(Skill::Trading, 0.05);
        seller.currency += price;
    });
    if paid.is_none() {
        return ActionOutcome::failure("market.nothing_affordable", "the seller is gone");
    }
    if let Some(listings) = ctx.store.place_mut(market_id).and_then(|p| p.listings_mut()) {
        listings[index].quantity -= 1;
        if listings[index].quantity == 0 {
            listings.remove(index);
        }
    }

    ActionOutcome::success("market.bought", format!("buys {} for {} coins", item.name(), price))
        .with_reward(0.5)
        .with_effect(SideEffect::RecordTransaction(Transaction { buyer: actor, seller, item, price, tick }))
}
