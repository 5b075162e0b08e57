mod property {
    mod condition;
    mod rules;
    mod validation;
}
