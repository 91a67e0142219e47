//! Lifecycle properties of the order status machine.
//!
//! Walks every request sequence up to a fixed length and checks that the
//! status only ever moves forward or escapes to `cancelled`.

use domain::{OrderError, OrderStatus};

fn rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Received => 0,
        OrderStatus::Preparing => 1,
        OrderStatus::Completed => 2,
        OrderStatus::Cancelled => 3,
    }
}

/// Every sequence of `len` requested statuses.
fn request_sequences(len: usize) -> Vec<Vec<OrderStatus>> {
    let mut sequences = vec![Vec::new()];
    for _ in 0..len {
        sequences = sequences
            .into_iter()
            .flat_map(|seq| {
                OrderStatus::ALL.into_iter().map(move |next| {
                    let mut extended = seq.clone();
                    extended.push(next);
                    extended
                })
            })
            .collect();
    }
    sequences
}

#[test]
fn status_never_moves_backward() {
    for requests in request_sequences(5) {
        let mut current = OrderStatus::default();
        for requested in requests {
            match current.transition_to(requested) {
                Ok(next) => {
                    assert!(rank(next) > rank(current), "{current} -> {next}");
                    current = next;
                }
                Err(OrderError::InvalidStatusTransition { from, to }) => {
                    assert_eq!(from, current);
                    assert_eq!(to, requested);
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }
}

#[test]
fn nothing_leaves_cancelled() {
    for requests in request_sequences(3) {
        let mut current = OrderStatus::Cancelled;
        for requested in requests {
            if let Ok(next) = current.transition_to(requested) {
                current = next;
            }
        }
        assert_eq!(current, OrderStatus::Cancelled);
    }
}

#[test]
fn inventory_is_debited_at_most_once_per_lifecycle() {
    for requests in request_sequences(5) {
        let mut current = OrderStatus::default();
        let mut debits = 0;
        for requested in requests {
            if let Ok(next) = current.transition_to(requested) {
                if OrderStatus::debits_inventory(current, next) {
                    debits += 1;
                }
                current = next;
            }
        }
        assert!(debits <= 1);
    }
}

#[test]
fn happy_path_reaches_completed() {
    let mut status = OrderStatus::Received;
    status = status.transition_to(OrderStatus::Preparing).unwrap();
    status = status.transition_to(OrderStatus::Completed).unwrap();
    assert_eq!(status, OrderStatus::Completed);
    assert!(status.transition_to(OrderStatus::Received).is_err());
    assert_eq!(
        status.transition_to(OrderStatus::Cancelled).unwrap(),
        OrderStatus::Cancelled
    );
}
