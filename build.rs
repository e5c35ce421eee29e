fn main() {
    // Propagates the ESP-IDF link arguments exported by esp-idf-sys when
    // building the firmware. Host builds have none to forward.
    embuild::espidf::sysenv::output();
}
