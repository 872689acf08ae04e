fn main() {
  pepinals::main();
}
