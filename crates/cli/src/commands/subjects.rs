//! `nova subjects`: list the subject modes and what to ask in each.

use nova_core::subject::SubjectMode;

pub fn run() {
    println!();
    println!("  📚 Subject modes");
    println!();
    for mode in SubjectMode::ALL {
        println!("  {:<12} {} {}", mode.key(), mode.icon(), mode.display_name());
        for suggestion in mode.suggestions() {
            println!("  {:<12}   • {suggestion}", "");
        }
        println!();
    }
    println!("  Use: nova chat --subject <key>   or   /subject <key> inside a chat");
    println!();
}
