use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Add;

/// Requirements for a node identifier
pub trait Identifier: Eq + Hash + Copy + Debug {}
impl<T> Identifier for T where T: Eq + Hash + Copy + Debug {}

/// Trait representing a frontier key: a cumulative cost, optionally plus an estimate.
///
/// Only a partial order is required so that floating point costs can be used directly.
/// Keys which cannot be compared (NaN) are treated as equal; graphs never produce them
/// because edge lengths are validated on insertion.
pub trait Weight: Default + Add<Output = Self> + PartialOrd + Copy + Debug {}
impl<T> Weight for T where T: Default + Add<Output = T> + PartialOrd + Copy + Debug {}

struct State<K: Weight, N: Identifier> {
  key: K,
  seq: u64,
  id: N,
}

impl<K: Weight, N: Identifier> Ord for State<K, N> {
  fn cmp(&self, other: &Self) -> Ordering {
    // Sorted desc, so the smallest key is on top of the max-heap.
    // Equal keys are popped in insertion order.
    other
      .key
      .partial_cmp(&self.key)
      .unwrap_or(Ordering::Equal)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

impl<K: Weight, N: Identifier> PartialOrd for State<K, N> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<K: Weight, N: Identifier> PartialEq for State<K, N> {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl<K: Weight, N: Identifier> Eq for State<K, N> {}

/// Min-priority queue of search frontier entries.
///
/// Entries come out by ascending key; entries with equal keys come out in the order they were
/// pushed, so a search over the same input always expands the same sequence of nodes.
pub struct Frontier<K: Weight, N: Identifier> {
  pq: BinaryHeap<State<K, N>>,
  next_seq: u64,
}

impl<K: Weight, N: Identifier> Frontier<K, N> {
  pub fn new() -> Self {
    Frontier {
      pq: BinaryHeap::new(),
      next_seq: 0,
    }
  }

  pub fn push(&mut self, id: N, key: K) {
    self.pq.push(State {
      key,
      seq: self.next_seq,
      id,
    });
    self.next_seq += 1;
  }

  pub fn pop(&mut self) -> Option<(N, K)> {
    self.pq.pop().map(|state| (state.id, state.key))
  }

  pub fn peek(&self) -> Option<(N, K)> {
    self.pq.peek().map(|state| (state.id, state.key))
  }

  pub fn len(&self) -> usize {
    self.pq.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pq.is_empty()
  }
}

impl<K: Weight, N: Identifier> Default for Frontier<K, N> {
  fn default() -> Self {
    Frontier::new()
  }
}

/// Bookkeeping of a single least-cost search.
///
/// Decrease-key is done by pushing another frontier entry; the outdated entry is dropped when it
/// surfaces because its node is already finalized by then.
pub struct SearchSpace<W: Weight, N: Identifier> {
  frontier: Frontier<W, N>,
  distance: HashMap<N, W>,
  // The origin is its own parent
  parent: HashMap<N, N>,
  finalized: HashSet<N>,
}

impl<W: Weight, N: Identifier> SearchSpace<W, N> {
  pub fn new() -> Self {
    SearchSpace {
      frontier: Frontier::new(),
      distance: HashMap::new(),
      parent: HashMap::new(),
      finalized: HashSet::new(),
    }
  }

  /// Seeds the search with `node` at zero cost and the given frontier key.
  pub fn init(&mut self, node: N, key: W) {
    self.distance.insert(node, W::default());
    self.parent.insert(node, node);
    self.frontier.push(node, key);
  }

  /// Pops the next node which is not finalized yet, skipping stale entries.
  pub fn next(&mut self) -> Option<N> {
    while let Some((id, _)) = self.frontier.pop() {
      if !self.finalized.contains(&id) {
        return Some(id);
      }
    }
    None
  }

  pub fn finalize(&mut self, node: N) {
    self.finalized.insert(node);
  }

  pub fn is_finalized(&self, node: N) -> bool {
    self.finalized.contains(&node)
  }

  /// Best known cost from the origin, `None` while the node is undiscovered.
  pub fn distance(&self, node: N) -> Option<W> {
    self.distance.get(&node).cloned()
  }

  /// Relaxes the edge `from -> to`.
  ///
  /// If going through `from` is cheaper than the best known cost of `to`, the cost and parent of
  /// `to` are updated and `to` is pushed with key `cost + estimate`. Finalized nodes are never
  /// updated. Returns whether the edge improved `to`.
  pub fn relax(&mut self, from: N, to: N, weight: W, estimate: W) -> bool {
    if self.finalized.contains(&to) {
      return false;
    }
    let from_cost = match self.distance.get(&from) {
      Some(cost) => *cost,
      None => return false,
    };
    let path_cost = from_cost + weight;
    if let Some(known) = self.distance.get(&to) {
      if path_cost.partial_cmp(known) != Some(Ordering::Less) {
        return false;
      }
    }

    self.distance.insert(to, path_cost);
    self.parent.insert(to, from);
    self.frontier.push(to, path_cost + estimate);
    true
  }

  /// Node sequence from the origin to `node`, both inclusive.
  pub fn unwind(&self, node: N) -> Vec<N> {
    unwind(&self.parent, node)
  }
}

/// Walks a parent map back from `node` to the root (the node which is its own parent) and
/// returns the nodes in travel order.
pub fn unwind<N: Identifier>(parent: &HashMap<N, N>, node: N) -> Vec<N> {
  let mut result: Vec<N> = Vec::new();

  let mut current_node = node;
  while let Some(parent_node) = parent.get(&current_node) {
    result.push(current_node);
    if current_node == *parent_node {
      break;
    }
    current_node = *parent_node;
  }
  // Need to reverse the list to get elements in the routing order
  result.reverse();
  result
}
