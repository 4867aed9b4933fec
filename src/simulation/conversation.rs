//! Conversations - oracle-driven dialogue between neighbors
//!
//! Two agents on touching cells may fall into conversation. Each tick the
//! agent whose turn it is asks the oracle for a line and, optionally, an
//! action. A line goes into both participants' histories and warms the
//! relationship; the action runs through the normal execution path. Walking
//! away, or anything else that leaves the pair on non-touching cells, ends
//! the conversation; otherwise the turn passes. A failed or slow oracle call
//! just hands the turn over.
//!
//! Agents talk in at most one conversation at a time, and anyone who spoke
//! or listened this tick sits out autonomous selection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::actions::catalog::ActionCategory;
use crate::command::resolver::resolve;
use crate::core::config::SimConfig;
use crate::core::random::RandomSource;
use crate::core::types::{EntityId, Tick};
use crate::ecs::world::World;
use crate::entity::relationships::DispositionKind;
use crate::entity::social::{SocialEvent, SocialEventKind};
use crate::llm::context::{AgentView, WorldView};
use crate::llm::oracle::{consult, ConversationRequest, DecisionOracle};
use crate::simulation::action_execute::execute_action;
use crate::simulation::tick::SimulationEvent;
use crate::society::economy::PriceTable;

type Pair = (EntityId, EntityId);

fn pair_key(a: EntityId, b: EntityId) -> Pair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Sorted by id
    pub participants: Pair,
    pub turn: EntityId,
    pub started_at: Tick,
    pub last_activity: Tick,
    pub exchanges: u32,
}

impl Conversation {
    /// `initiator` speaks first
    pub fn new(initiator: EntityId, other: EntityId, tick: Tick) -> Self {
        Self {
            participants: pair_key(initiator, other),
            turn: initiator,
            started_at: tick,
            last_activity: tick,
            exchanges: 0,
        }
    }

    pub fn involves(&self, id: EntityId) -> bool {
        self.participants.0 == id || self.participants.1 == id
    }

    /// The participant who is not `id`
    pub fn other(&self, id: EntityId) -> EntityId {
        if self.participants.0 == id {
            self.participants.1
        } else {
            self.participants.0
        }
    }

    pub fn is_stale(&self, tick: Tick, timeout: u64) -> bool {
        tick.saturating_sub(self.last_activity) > timeout
    }
}

/// Active conversations keyed by sorted participant pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Conversation>", into = "Vec<Conversation>")]
pub struct Conversations {
    by_pair: BTreeMap<Pair, Conversation>,
}

impl Conversations {
    pub fn get(&self, a: EntityId, b: EntityId) -> Option<&Conversation> {
        self.by_pair.get(&pair_key(a, b))
    }

    /// The conversation `id` is part of, if any
    pub fn involving(&self, id: EntityId) -> Option<&Conversation> {
        self.by_pair.values().find(|c| c.involves(id))
    }

    pub fn is_talking(&self, id: EntityId) -> bool {
        self.involving(id).is_some()
    }

    /// Fails if the two are the same agent or either is already talking
    pub fn start(&mut self, initiator: EntityId, other: EntityId, tick: Tick) -> bool {
        if initiator == other || self.is_talking(initiator) || self.is_talking(other) {
            return false;
        }
        let conversation = Conversation::new(initiator, other, tick);
        self.by_pair.insert(conversation.participants, conversation);
        true
    }

    pub fn end(&mut self, a: EntityId, b: EntityId) -> Option<Conversation> {
        self.by_pair.remove(&pair_key(a, b))
    }

    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.by_pair.values()
    }

    fn get_mut(&mut self, pair: Pair) -> Option<&mut Conversation> {
        self.by_pair.get_mut(&pair)
    }

    /// Remove and return conversations that matched `stale`
    fn drain_where(&mut self, stale: impl Fn(&Conversation) -> bool) -> Vec<Conversation> {
        let pairs: Vec<Pair> = self.by_pair.values().filter(|c| stale(c)).map(|c| c.participants).collect();
        pairs.into_iter().filter_map(|p| self.by_pair.remove(&p)).collect()
    }
}

impl From<Vec<Conversation>> for Conversations {
    fn from(list: Vec<Conversation>) -> Self {
        let mut conversations = Self::default();
        for mut conversation in list {
            conversation.participants = pair_key(conversation.participants.0, conversation.participants.1);
            conversations.by_pair.insert(conversation.participants, conversation);
        }
        conversations
    }
}

impl From<Conversations> for Vec<Conversation> {
    fn from(conversations: Conversations) -> Self {
        conversations.by_pair.into_values().collect()
    }
}

fn can_talk(world: &World, id: EntityId) -> bool {
    world.store.agent(id).map_or(false, |a| a.is_active() && !a.is_imprisoned())
}

fn within_earshot(world: &World, pair: Pair) -> bool {
    match (world.store.agent(pair.0), world.store.agent(pair.1)) {
        (Some(a), Some(b)) => a.position.is_adjacent(&b.position),
        _ => false,
    }
}

/// Drop conversations nobody touched in time, whose participants can no
/// longer talk, or who drifted apart
fn collect_garbage(world: &mut World, config: &SimConfig, events: &mut Vec<SimulationEvent>) {
    let tick = world.current_tick;
    let silent: BTreeSet<EntityId> = world
        .conversations
        .iter()
        .flat_map(|c| [c.participants.0, c.participants.1])
        .filter(|id| !can_talk(world, *id))
        .collect();
    let apart: BTreeSet<Pair> = world
        .conversations
        .iter()
        .map(|c| c.participants)
        .filter(|pair| !within_earshot(world, *pair))
        .collect();
    let timeout = config.conversation_timeout_ticks;
    let ended = world.conversations.drain_where(|c| {
        c.is_stale(tick, timeout)
            || silent.contains(&c.participants.0)
            || silent.contains(&c.participants.1)
            || apart.contains(&c.participants)
    });
    for conversation in ended {
        tracing::debug!(a = conversation.participants.0 .0, b = conversation.participants.1 .0, "conversation dropped");
        events.push(SimulationEvent::ConversationEnded { tick, participants: conversation.participants });
    }
}

/// Neighbors with nothing better to do may strike up a conversation
fn start_conversations(
    world: &mut World,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
    events: &mut Vec<SimulationEvent>,
) {
    let tick = world.current_tick;
    for id in world.store.agent_ids() {
        if world.conversations.is_talking(id) || !can_talk(world, id) {
            continue;
        }
        let Some(position) = world.store.agent(id).map(|a| a.position) else {
            continue;
        };
        let partner = world
            .store
            .agents()
            .filter(|other| other.id != id && other.position.is_adjacent(&position))
            .map(|other| other.id)
            .find(|other| can_talk(world, *other) && !world.conversations.is_talking(*other));
        let Some(partner) = partner else {
            continue;
        };
        if rng.chance(config.conversation_start_chance) && world.conversations.start(id, partner, tick) {
            tracing::debug!(a = id.0, b = partner.0, "conversation started");
            events.push(SimulationEvent::ConversationStarted { tick, participants: pair_key(id, partner) });
        }
    }
}

fn conversation_request(
    world: &World,
    speaker: EntityId,
    listener: EntityId,
    config: &SimConfig,
) -> Option<ConversationRequest> {
    let speaker_agent = world.store.agent(speaker)?;
    let listener_agent = world.store.agent(listener)?;
    Some(ConversationRequest {
        speaker: AgentView::from_agent(world, speaker_agent, config.proximity_threshold),
        listener: AgentView::from_agent(world, listener_agent, config.proximity_threshold),
        history: speaker_agent.conversation_history.recent(config.oracle_history_lines).cloned().collect(),
        world: WorldView::from_world(world),
        actions: world.catalog.names().into_iter().map(str::to_string).collect(),
    })
}

fn pass_turn(world: &mut World, pair: Pair, next: EntityId) {
    if let Some(conversation) = world.conversations.get_mut(pair) {
        conversation.turn = next;
    }
}

/// One turn of one conversation
async fn take_turn<O: DecisionOracle>(
    world: &mut World,
    pair: Pair,
    prices: &PriceTable,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
    oracle: &O,
    events: &mut Vec<SimulationEvent>,
) {
    let tick = world.current_tick;
    let Some((speaker, listener)) = world.conversations.get(pair.0, pair.1).map(|c| (c.turn, c.other(c.turn))) else {
        return;
    };
    let Some(request) = conversation_request(world, speaker, listener, config) else {
        world.conversations.end(pair.0, pair.1);
        return;
    };

    let reply = match consult(config.oracle_timeout_ms, oracle.converse(&request)).await {
        Ok(Some(reply)) => reply,
        Ok(None) => {
            pass_turn(world, pair, listener);
            return;
        }
        Err(e) => {
            tracing::warn!(agent = speaker.0, error = %e, "oracle failed during conversation");
            events.push(SimulationEvent::OracleFailed { tick, agent: speaker, reason: e.to_string() });
            pass_turn(world, pair, listener);
            return;
        }
    };

    let line = format!("{}: {}", request.speaker.name, reply.dialogue);
    world.store.with_pair_mut(speaker, listener, |s, l| {
        s.conversation_history.push(line.clone());
        l.conversation_history.push(line.clone());

        let speaker_side = s.relationships.ensure(listener);
        speaker_side.add_score(config.conversation_increment);
        speaker_side.disposition.add(DispositionKind::Trust, config.conversation_trust_gain);
        l.relationships.ensure(speaker).add_score(config.conversation_increment);
    });
    if let Some(conversation) = world.conversations.get_mut(pair) {
        conversation.last_activity = tick;
        conversation.exchanges += 1;
        if conversation.exchanges == 1 {
            for (me, them) in [(speaker, listener), (listener, speaker)] {
                if let Some(agent) = world.store.agent_mut(me) {
                    agent.remember(SocialEvent::new(tick, SocialEventKind::Conversation, them, "talked"));
                }
            }
        }
    }
    events.push(SimulationEvent::Spoke { tick, speaker, listener, line });

    let action = reply.action.as_deref().and_then(|name| resolve(&world.catalog, name).into_action());
    let walked_away = match action {
        Some(action) => {
            execute_action(world, speaker, &action, prices, config, rng, events);
            action.effect.category() == ActionCategory::Movement || !within_earshot(world, pair)
        }
        None => false,
    };

    if walked_away {
        world.conversations.end(pair.0, pair.1);
        tracing::debug!(a = pair.0 .0, b = pair.1 .0, "conversation ended by departure");
        events.push(SimulationEvent::ConversationEnded { tick, participants: pair });
    } else {
        pass_turn(world, pair, listener);
    }
}

/// Run the conversation phase of a tick. Returns everyone who took part.
pub async fn run_conversations<O: DecisionOracle>(
    world: &mut World,
    prices: &PriceTable,
    config: &SimConfig,
    rng: &mut dyn RandomSource,
    oracle: &O,
    events: &mut Vec<SimulationEvent>,
) -> BTreeSet<EntityId> {
    collect_garbage(world, config, events);
    start_conversations(world, config, rng, events);

    let pairs: Vec<Pair> = world.conversations.iter().map(|c| c.participants).collect();
    let mut busy = BTreeSet::new();
    for pair in pairs {
        busy.insert(pair.0);
        busy.insert(pair.1);
        take_turn(world, pair, prices, config, rng, oracle, events).await;
    }
    busy
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::core::error::{CivError, Result};
    use crate::core::random::ScriptedRandom;
    use crate::core::types::GridPos;
    use crate::ecs::world::Environment;
    use crate::entity::inventory::Item;
    use crate::llm::oracle::ChoiceRequest;
    use crate::llm::parser::ConversationReply;

    /// Replays canned replies; errors once the script runs out
    struct ScriptedOracle {
        replies: RefCell<VecDeque<Result<Option<ConversationReply>>>>,
    }

    impl ScriptedOracle {
        fn new(replies: Vec<Result<Option<ConversationReply>>>) -> Self {
            Self { replies: RefCell::new(replies.into()) }
        }
    }

    impl DecisionOracle for ScriptedOracle {
        async fn choose_action(&self, _request: &ChoiceRequest) -> Result<Option<String>> {
            Ok(None)
        }

        async fn converse(&self, _request: &ConversationRequest) -> Result<Option<ConversationReply>> {
            self.replies.borrow_mut().pop_front().unwrap_or(Err(CivError::Oracle("script exhausted".into())))
        }
    }

    fn say(dialogue: &str, action: Option<&str>) -> Result<Option<ConversationReply>> {
        Ok(Some(ConversationReply { dialogue: dialogue.into(), action: action.map(str::to_string) }))
    }

    fn talking_pair() -> (World, SimConfig, EntityId, EntityId) {
        let config = SimConfig::default();
        let mut world = World::new(Environment::new("Vale", 10, 10));
        let a = world.spawn_agent("Ada", GridPos::new(4, 4), &config);
        let b = world.spawn_agent("Bo", GridPos::new(5, 4), &config);
        assert!(world.conversations.start(a, b, 0));
        (world, config, a, b)
    }

    async fn run(world: &mut World, config: &SimConfig, oracle: &ScriptedOracle) -> Vec<SimulationEvent> {
        let prices = world.price_table(config);
        let mut events = Vec::new();
        // 0.9 never starts a conversation
        let mut rng = ScriptedRandom::constant(0.9);
        run_conversations(world, &prices, config, &mut rng, oracle, &mut events).await;
        events
    }

    #[test]
    fn test_one_conversation_per_agent() {
        let mut conversations = Conversations::default();
        assert!(conversations.start(EntityId(2), EntityId(1), 0));
        assert!(!conversations.start(EntityId(1), EntityId(3), 0));
        assert!(!conversations.start(EntityId(4), EntityId(4), 0));
        let c = conversations.get(EntityId(1), EntityId(2)).unwrap();
        assert_eq!(c.participants, (EntityId(1), EntityId(2)));
        assert_eq!(c.turn, EntityId(2));
    }

    #[test]
    fn test_serializes_as_list() {
        let mut conversations = Conversations::default();
        conversations.start(EntityId(1), EntityId(2), 3);
        let json = serde_json::to_string(&conversations).unwrap();
        assert!(json.starts_with('['));
        let back: Conversations = serde_json::from_str(&json).unwrap();
        assert_eq!(back, conversations);
    }

    #[tokio::test]
    async fn test_line_warms_relationship_and_passes_turn() {
        let (mut world, config, a, b) = talking_pair();
        let oracle = ScriptedOracle::new(vec![say("Good harvest this year.", None)]);

        let events = run(&mut world, &config, &oracle).await;

        let ada = world.store.agent(a).unwrap();
        let bo = world.store.agent(b).unwrap();
        assert_eq!(ada.conversation_history.latest().map(String::as_str), Some("Ada: Good harvest this year."));
        assert_eq!(bo.conversation_history.len(), 1);
        assert_eq!(ada.relationships.score(b), config.conversation_increment);
        assert_eq!(bo.relationships.score(a), config.conversation_increment);
        assert_eq!(ada.relationships.get(b).unwrap().disposition.get(DispositionKind::Trust), 0.1);
        assert_eq!(world.conversations.get(a, b).unwrap().turn, b);
        assert!(events.iter().any(|e| matches!(e, SimulationEvent::Spoke { speaker, .. } if *speaker == a)));
    }

    #[tokio::test]
    async fn test_movement_ends_conversation() {
        let (mut world, config, a, b) = talking_pair();
        let oracle = ScriptedOracle::new(vec![say("I must go.", Some("move north"))]);

        run(&mut world, &config, &oracle).await;

        assert!(world.conversations.get(a, b).is_none());
        assert_eq!(world.store.agent(a).unwrap().position, GridPos::new(4, 3));
    }

    #[tokio::test]
    async fn test_drifting_apart_ends_conversation() {
        let (mut world, config, a, b) = talking_pair();
        world.spawn_place("Forest", GridPos::new(0, 4), |p| p.with_resource(Item::Wood, 5));
        let oracle = ScriptedOracle::new(vec![say("Back to work.", Some("gather wood"))]);

        let events = run(&mut world, &config, &oracle).await;

        assert_eq!(world.store.agent(a).unwrap().position, GridPos::new(3, 4));
        assert!(world.conversations.get(a, b).is_none());
        assert!(matches!(events.last(), Some(SimulationEvent::ConversationEnded { .. })));
    }

    #[tokio::test]
    async fn test_separated_pair_is_collected() {
        let (mut world, config, a, b) = talking_pair();
        world.store.agent_mut(b).unwrap().position = GridPos::new(8, 8);
        let oracle = ScriptedOracle::new(vec![]);

        let events = run(&mut world, &config, &oracle).await;

        assert!(world.conversations.get(a, b).is_none());
        assert!(matches!(events.as_slice(), [SimulationEvent::ConversationEnded { .. }]));
    }

    #[tokio::test]
    async fn test_oracle_failure_only_passes_turn() {
        let (mut world, config, a, b) = talking_pair();
        let oracle = ScriptedOracle::new(vec![Err(CivError::OracleTimeout)]);

        let events = run(&mut world, &config, &oracle).await;

        let ada = world.store.agent(a).unwrap();
        assert!(ada.conversation_history.is_empty());
        assert!(ada.relationships.get(b).is_none());
        assert_eq!(world.conversations.get(a, b).unwrap().turn, b);
        assert!(matches!(events.as_slice(), [SimulationEvent::OracleFailed { .. }]));
    }

    #[tokio::test]
    async fn test_idle_conversation_is_collected() {
        let (mut world, config, a, b) = talking_pair();
        world.current_tick = config.conversation_timeout_ticks + 1;
        let oracle = ScriptedOracle::new(vec![]);

        let events = run(&mut world, &config, &oracle).await;

        assert!(world.conversations.get(a, b).is_none());
        assert!(matches!(events[0], SimulationEvent::ConversationEnded { .. }));
    }
}
