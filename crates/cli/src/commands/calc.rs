//! `nova calc`: the calculator on its own, no model call.

pub fn run(expression: &str) {
    println!("{}", nova_tools::calculate_message(expression));
}
