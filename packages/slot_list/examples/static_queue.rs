//! A `static` work queue shared between threads without any heap allocation by the queue.

use std::thread;

use slot_list::SlotList;

#[derive(Debug)]
struct Job {
    id: u32,
    payload: [u8; 16],
}

static QUEUE: SlotList<Job, 8> = SlotList::new();

fn main() {
    let producer = thread::spawn(|| {
        for id in 0..32 {
            let mut job = Job {
                id,
                payload: [u8::try_from(id).unwrap_or(u8::MAX); 16],
            };

            // The queue is bounded. Retry until a consumer has made space.
            loop {
                match QUEUE.push_back(job) {
                    Ok(()) => break,
                    Err(full) => {
                        job = full.into_inner();
                        thread::yield_now();
                    }
                }
            }
        }
    });

    let mut processed = 0;

    while processed < 32 {
        // Process the job in place, the slot is released after the closure returns.
        let checksum = QUEUE.consume_front(|job| {
            job.payload
                .iter()
                .map(|byte| u32::from(*byte))
                .sum::<u32>()
                .wrapping_add(job.id)
        });

        match checksum {
            Some(checksum) => {
                processed += 1;
                println!("Processed job {processed} with checksum {checksum}");
            }
            None => thread::yield_now(),
        }
    }

    producer.join().unwrap();

    println!("Queue is empty: {}", QUEUE.is_empty());
}
