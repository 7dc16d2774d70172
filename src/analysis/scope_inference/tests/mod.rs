mod clustering_tests;
