//! Kitchen Queue - tiered order sequence
//!
//! Orders are kept in three consecutive zones:
//!
//! ```text
//! [VIP, by prep time] [Express, arrival order] [Normal, by prep time]
//! ```
//!
//! The sequence is a doubly-linked list stored in an arena: nodes live in a
//! `Vec` of slots and link to each other by slot index, freed slots are
//! chained into a free list and reused by later inserts. No slot index ever
//! leaves this module.

use super::error::QueueError;
use super::order::{NewOrderRequest, Order, Tier};

// 队列中的一个节点
#[derive(Debug, Clone)]
struct OrderNode {
    order: Order,
    // 前一个订单
    prev: Option<usize>,
    // 后一个订单
    next: Option<usize>,
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(OrderNode),
    // 空闲槽位，串成空闲链表
    Free { next_free: Option<usize> },
}

/// Ordered queue of kitchen orders. The front is the order in progress.
#[derive(Debug, Clone, Default)]
pub struct KitchenQueue {
    // 节点池，所有订单都存放在这里
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
    // 空闲链表头
    free_list_head: Option<usize>,
    len: usize,
}

impl KitchenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        KitchenQueue {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a non-VIP order: express orders join the end of the express run,
    /// normal orders are placed by prep time behind every VIP and express
    /// order.
    pub fn insert_normal(&mut self, request: NewOrderRequest) {
        self.insert(Order::from_request(request, false));
    }

    /// Adds a VIP order ahead of every non-VIP order, sorted by prep time
    /// among the VIPs already queued.
    pub fn insert_vip(&mut self, request: NewOrderRequest) {
        self.insert(Order::from_request(request, true));
    }

    /// Inserts an already classified order before the first order it does
    /// not pass, or at the tail.
    pub fn insert(&mut self, order: Order) {
        let mut current = self.head;
        while let Some(index) = current {
            let node = self.node(index);
            if !node.order.is_passed_by(&order) {
                break;
            }
            current = node.next;
        }

        tracing::trace!(id = order.id, tier = %order.tier, prep_time = order.prep_time, "inserting order");

        let index = self.allocate(order);
        match current {
            Some(before) => self.link_before(index, before),
            None => self.link_at_tail(index),
        }
        self.len += 1;
    }

    /// Removes the order at the front of the queue.
    pub fn complete_front(&mut self) -> Result<Order, QueueError> {
        let head = self.head.ok_or(QueueError::EmptyQueue)?;
        Ok(self.remove_at(head))
    }

    /// Removes the front-most order with the given id, wherever it sits.
    ///
    /// Duplicate ids are not rejected on insert; only the first match is
    /// removed here.
    pub fn cancel_by_id(&mut self, id: i64) -> Result<Order, QueueError> {
        if self.is_empty() {
            return Err(QueueError::EmptyQueue);
        }
        let index = self.position_of(id).ok_or(QueueError::NotFound(id))?;
        Ok(self.remove_at(index))
    }

    pub fn front(&self) -> Option<&Order> {
        self.head.map(|index| &self.node(index).order)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.position_of(id).is_some()
    }

    /// Iterates front to back.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            queue: self,
            current: self.head,
            remaining: self.len,
        }
    }

    /// Copies the queue contents front to back.
    pub fn snapshot(&self) -> Vec<Order> {
        self.iter().cloned().collect()
    }

    /// Number of queued orders in each tier, as `(vip, express, normal)`.
    pub fn tier_counts(&self) -> (usize, usize, usize) {
        self.iter().fold((0, 0, 0), |(vip, express, normal), order| match order.tier {
            Tier::Vip => (vip + 1, express, normal),
            Tier::Express => (vip, express + 1, normal),
            Tier::Normal => (vip, express, normal + 1),
        })
    }

    fn position_of(&self, id: i64) -> Option<usize> {
        let mut current = self.head;
        while let Some(index) = current {
            let node = self.node(index);
            if node.order.id == id {
                return Some(index);
            }
            current = node.next;
        }
        None
    }

    fn node(&self, index: usize) -> &OrderNode {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => unreachable!("linked slot {index} is free"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut OrderNode {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => unreachable!("linked slot {index} is free"),
        }
    }

    // 分配节点索引，优先复用空闲槽位
    fn allocate(&mut self, order: Order) -> usize {
        let node = Slot::Occupied(OrderNode {
            order,
            prev: None,
            next: None,
        });

        if let Some(free_index) = self.free_list_head {
            if let Slot::Free { next_free } = &self.slots[free_index] {
                self.free_list_head = *next_free;
            }
            self.slots[free_index] = node;
            free_index
        } else {
            self.slots.push(node);
            self.slots.len() - 1
        }
    }

    fn link_before(&mut self, index: usize, before: usize) {
        let prev = self.node(before).prev;
        {
            let node = self.node_mut(index);
            node.prev = prev;
            node.next = Some(before);
        }
        self.node_mut(before).prev = Some(index);
        match prev {
            Some(prev_index) => self.node_mut(prev_index).next = Some(index),
            // 插入到队首
            None => self.head = Some(index),
        }
    }

    fn link_at_tail(&mut self, index: usize) {
        match self.tail {
            Some(tail_index) => {
                self.node_mut(tail_index).next = Some(index);
                self.node_mut(index).prev = Some(tail_index);
            }
            // 队列为空
            None => self.head = Some(index),
        }
        self.tail = Some(index);
    }

    // 从链表中摘除节点，并把槽位放回空闲链表
    fn remove_at(&mut self, index: usize) -> Order {
        let slot = std::mem::replace(
            &mut self.slots[index],
            Slot::Free {
                next_free: self.free_list_head,
            },
        );
        let node = match slot {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => unreachable!("removing free slot {index}"),
        };
        self.free_list_head = Some(index);

        match node.prev {
            Some(prev_index) => self.node_mut(prev_index).next = node.next,
            // 节点是头节点
            None => self.head = node.next,
        }
        match node.next {
            Some(next_index) => self.node_mut(next_index).prev = node.prev,
            // 节点是尾节点
            None => self.tail = node.prev,
        }

        self.len -= 1;
        node.order
    }
}

/// Front-to-back iterator over a [`KitchenQueue`].
pub struct Iter<'a> {
    queue: &'a KitchenQueue,
    current: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let node = self.queue.node(index);
        self.current = node.next;
        self.remaining -= 1;
        Some(&node.order)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a KitchenQueue {
    type Item = &'a Order;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
