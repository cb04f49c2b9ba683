use clap::Parser;
use hopscotch_map::HashMap;

#[derive(Parser, Debug)]
struct Args {
    /// Number of elements the map is sized for up front.
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of inserted keys removed again before reporting, in percent.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 0)]
    remove_percent: u8,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashMap with target capacity: {}",
        args.target_capacity
    );

    let mut map: HashMap<u64, u64> = HashMap::with_capacity(args.target_capacity);

    println!(
        "Buckets: {}, neighborhood: {}, max population: {}",
        map.capacity(),
        map.neighborhood_size(),
        map.max_population()
    );
    println!("Filling map with u64 keys...");

    let num_values = map.max_population() as u64;
    for value in 0..num_values {
        map.insert(value, value);
    }

    let to_remove = num_values * args.remove_percent.min(100) as u64 / 100;
    let evens = (0..num_values).step_by(2);
    let odds = (1..num_values).step_by(2);
    for value in evens.chain(odds).take(to_remove as usize) {
        map.remove(&value);
    }

    println!("Inserted {} values, removed {}", num_values, to_remove);
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    map.probe_histogram().print();
    map.stats().print();
}
