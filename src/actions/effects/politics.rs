use crate::actions::context::ActionContext;
use crate::actions::outcome::{ActionOutcome, SideEffect};
use crate::core::types::EntityId;
use crate::entity::psyche::Emotion;
use crate::society::government::{Law, Offense};

const LAW_PUNISHMENT: u64 = 20;

/// Vote for the candidate the voter likes best; themselves if they are running
pub(super) fn vote(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(election) = ctx.facts.election.filter(|e| e.active) else {
        return ActionOutcome::failure("vote.no_election", "has no election to vote in");
    };
    if election.candidates.is_empty() {
        return ActionOutcome::failure("vote.no_candidates", "finds no candidates on the ballot");
    }
    if election.voters.contains(&actor) {
        return ActionOutcome::failure("vote.already_voted", "has already voted");
    }
    let Some(voter) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };

    let affinity = |candidate: EntityId| {
        if candidate == actor {
            100.0
        } else {
            voter.relationships.score(candidate)
        }
    };
    let mut ballot = election.candidates.clone();
    ballot.sort();
    let choice = ballot.into_iter().fold(None, |best: Option<(EntityId, f32)>, c| match best {
        Some((_, top)) if top >= affinity(c) => best,
        _ => Some((c, affinity(c))),
    });
    let Some((candidate, _)) = choice else {
        return ActionOutcome::failure("vote.no_candidates", "finds no candidates on the ballot");
    };

    let name = ctx.store.agent(candidate).map(|c| c.name.clone()).unwrap_or_default();
    ActionOutcome::success("vote.ok", format!("votes for {}", name))
        .with_reward(0.5)
        .with_effect(SideEffect::CastVote { voter: actor, candidate })
}

pub(super) fn run_for_office(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let Some(election) = ctx.facts.election.filter(|e| e.active) else {
        return ActionOutcome::failure("candidacy.no_election", "has no election to enter");
    };
    if election.candidates.contains(&actor) {
        return ActionOutcome::failure("candidacy.already_running", "is already a candidate");
    }
    let status = ctx.store.agent(actor).map_or(0.0, |a| a.social_status);
    if status < ctx.config.candidacy_status {
        return ActionOutcome::failure("candidacy.low_status", "lacks the standing to run");
    }
    ActionOutcome::success("candidacy.ok", "stands for office")
        .with_reward(0.8)
        .with_effect(SideEffect::RegisterCandidate { candidate: actor })
}

/// The leader puts a ban to the community. Each member's support is weighted by
/// how much they like the leader and how agreeable they are.
pub(super) fn propose_law(ctx: &mut ActionContext<'_>, actor: EntityId) -> ActionOutcome {
    let government = ctx.facts.government;
    if government.leader != Some(actor) {
        return ActionOutcome::failure("law.not_leader", "has no authority to propose laws");
    }
    let Some(offense) = [Offense::Fighting, Offense::Stealing]
        .into_iter()
        .find(|o| government.law_against(*o).is_none())
    else {
        return ActionOutcome::failure("law.nothing_to_propose", "sees no law worth adding");
    };

    let Some(leader) = ctx.store.agent(actor) else {
        return ActionOutcome::failure("agent.unavailable", "agent vanished");
    };
    let voters: Vec<EntityId> = match leader.culture_id() {
        Some(culture) => ctx.store.for_culture(culture).to_vec(),
        None => ctx.store.agent_ids(),
    };
    let weights: Vec<f32> = voters
        .iter()
        .filter(|id| **id != actor)
        .filter_map(|id| ctx.store.agent(*id))
        .filter(|a| a.is_active())
        .map(|a| 0.5 * (a.relationships.score(actor) / 100.0) + 0.5 * a.personality.agreeableness)
        .collect();

    // The leader's own vote always counts in favor
    let support = (1.0 + weights.iter().sum::<f32>()) / (1.0 + weights.len() as f32);
    let law = Law::against(offense, LAW_PUNISHMENT);
    tracing::info!(leader = actor.0, law = %law.name, support, "law proposed");

    if support > ctx.config.law_majority {
        if let Some(leader) = ctx.store.agent_mut(actor) {
            leader.emotions.add(Emotion::Pride, 0.3);
        }
        ActionOutcome::success("law.enacted", format!("passes {} with {:.0}% support", law.name, support * 100.0))
            .with_reward(1.0)
            .with_effect(SideEffect::EnactLaw(law))
    } else {
        ActionOutcome::failure("law.rejected", format!("fails to pass {}", law.name))
    }
}
