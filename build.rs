fn main() {
    // ESP-IDF builds need the sysenv exported for linking; host builds have
    // nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
