fn main() {
    deha_lib::run()
}
