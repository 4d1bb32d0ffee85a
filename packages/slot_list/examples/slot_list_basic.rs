//! Basic usage of `SlotList`: appending, taking from the front and selective removal.

use slot_list::{DropPolicy, SlotList};

fn main() {
    let list = SlotList::<String, 4>::builder()
        .drop_policy(DropPolicy::MustNotDropItems)
        .build();

    for name in ["alpha", "beta", "gamma", "delta"] {
        list.push_back(name.to_string()).unwrap();
    }

    println!("Appended {} items, list is full: {}", list.len(), list.is_full());

    // A full list hands the rejected value back instead of growing.
    match list.push_back("epsilon".to_string()) {
        Ok(()) => unreachable!("list has no free slots"),
        Err(full) => {
            println!("Rejected: {full}");
            println!("Got back: {}", full.into_inner());
        }
    }

    if let Some(first) = list.pop_front() {
        println!("Popped from front: {first}");
    }

    let length = list.consume_front(|second| second.len());
    println!("Length of second item, consumed in place: {length:?}");

    let removed = list.remove_if(|name| name.starts_with('d'));
    println!("Removed {removed} item(s) starting with 'd'");

    {
        let mut locked = list.lock();

        for name in locked.iter_mut() {
            name.make_ascii_uppercase();
        }

        println!("Remaining: {:?}", locked.iter().collect::<Vec<_>>());
    }

    // The drop policy requires the list to be empty when it is dropped.
    list.clear_with(|name| println!("Cleared: {name}"));
}
