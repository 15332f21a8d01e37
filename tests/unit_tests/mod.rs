mod connectivity;
mod kernel;
mod predicates;
mod quadrature;
mod solver;
